//! Doorman - authorization core for the building-asset admin console.
//!
//! Converts flat organization/permission records into trees, resolves a
//! user's effective permission set from their role assignments, and answers
//! allow/deny/redirect questions for routes, menus, and guarded views.
//! All evaluation is pure: every operation takes the current tables as
//! parameters, so role edits take effect on the next evaluation without any
//! propagation step.

pub mod catalog;
pub mod errors;
pub mod evaluator;
pub mod guard;
pub mod loader;
pub mod policy;
pub mod settings;
pub mod snapshot;
pub mod tree;
pub mod types;
pub mod web;

use std::collections::HashMap;
use types::{MenuItem, Role, RouteRule};

/// Fully compiled access state, loaded from KDL policy files.
/// Immutable after construction — updates install a fresh snapshot through
/// [`snapshot::StateCell`] instead of editing in place.
#[derive(Debug, Clone, Default)]
pub struct AccessState {
    /// role id -> Role (code, name, permission codes, status)
    pub roles: HashMap<i64, Role>,
    /// route path -> RouteRule (required codes + mode)
    pub routes: HashMap<String, RouteRule>,
    /// Sidebar menu tree, filtered per user by the evaluator.
    pub menus: Vec<MenuItem>,
}
