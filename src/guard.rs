//! The decision point invoked before rendering a protected view or
//! navigating to a guarded route.
//!
//! A guard invocation never fails: every input, including an absent user,
//! maps to one of three terminal decisions. `Denied` renders a fallback in
//! place (e.g. hides a button); `Redirected` navigates away (e.g. blocks an
//! entire page).

use std::collections::HashMap;

use crate::catalog::resolve_permissions;
use crate::evaluator::{has_all, has_any};
use crate::types::{RequireMode, Role, User};

/// Terminal outcome of a guard invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
    Redirected { target: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// What a guarded view demands: the required codes, how they combine, and
/// where to send a denied caller instead of rendering in place.
#[derive(Debug, Clone, Default)]
pub struct Requirement {
    pub codes: Vec<String>,
    pub mode: RequireMode,
    pub redirect: Option<String>,
}

/// Evaluate a guard invocation, in strict order:
///
/// 1. no authenticated user -> `Redirected` to `login_target` (the one
///    hard-coded fail-closed path, applied before anything else);
/// 2. empty requirement -> `Allowed` unconditionally;
/// 3. resolve the user's permission set and apply the mode;
/// 4. pass -> `Allowed`; fail -> `Redirected` when the requirement carries a
///    redirect target, else `Denied`.
pub fn evaluate(
    user: Option<&User>,
    roles: &HashMap<i64, Role>,
    requirement: &Requirement,
    login_target: &str,
) -> Decision {
    let Some(user) = user else {
        return Decision::Redirected {
            target: login_target.to_string(),
        };
    };

    if requirement.codes.is_empty() {
        return Decision::Allowed;
    }

    let set = resolve_permissions(user, roles);
    let passed = match requirement.mode {
        RequireMode::All => has_all(&set, &requirement.codes),
        RequireMode::Any => has_any(&set, &requirement.codes),
    };

    if passed {
        Decision::Allowed
    } else {
        match &requirement.redirect {
            Some(target) => Decision::Redirected {
                target: target.clone(),
            },
            None => Decision::Denied,
        }
    }
}
