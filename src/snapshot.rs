//! Read-mostly snapshot cell for the compiled access state.
//!
//! Readers take a cheap `Arc` clone and evaluate against it; a policy
//! mutation installs a fresh snapshot on an explicit signal (the `/v1/reload`
//! endpoint) rather than polling. No reader can observe a partially-updated
//! table: in-flight evaluations keep the snapshot they started with.

use std::sync::{Arc, RwLock};

use crate::AccessState;

#[derive(Debug)]
pub struct StateCell {
    inner: RwLock<Arc<AccessState>>,
}

impl StateCell {
    pub fn new(state: AccessState) -> Self {
        Self {
            inner: RwLock::new(Arc::new(state)),
        }
    }

    /// The current snapshot. The returned `Arc` stays valid across any
    /// number of `install` calls.
    pub fn current(&self) -> Arc<AccessState> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the snapshot. Subsequent `current` calls see the new state.
    pub fn install(&self, state: AccessState) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(state);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(AccessState::default())
    }
}
