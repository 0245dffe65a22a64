use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Resolved set of permission codes available to a user at evaluation time.
pub type PermissionSet = HashSet<String>;

/// Record status shared by organizations, permissions, and roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
}

/// A flat, parent-referencing record — the raw unit the tree builder
/// consumes. Both organization and permission tables decode into this shape.
///
/// `id` is unique within a collection (duplicates resolve last-seen-wins at
/// build time); `parent_id` should reference another id in the same
/// collection, but dangling references are tolerated (see [`crate::tree`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    /// Stable code, e.g. `"asset:view"` for permissions or `"hq"` for orgs.
    pub code: String,
    /// Record kind, e.g. `"department"` or `"menu"`. Wire name is `type`.
    #[serde(rename = "type")]
    pub kind: String,
    pub status: Status,
}

/// Derived tree view over a [`Node`]. Built fresh on every
/// [`crate::tree::build_forest`] call; rebuilding is the only update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub node: Node,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

/// An administrator-managed role: a named bag of permission codes.
/// The core treats each role as an immutable snapshot per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub permission_codes: HashSet<String>,
    pub status: Status,
}

/// The authenticated user, reduced to what evaluation needs: role
/// assignments. Effective permissions are derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub role_ids: HashSet<i64>,
}

/// How a list of required codes combines: any one suffices, or all must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequireMode {
    /// At least one required code present (the mode every observed admin
    /// screen uses).
    #[default]
    Any,
    /// Every required code present.
    All,
}

/// Static route -> required-permissions configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub route_path: String,
    pub required_codes: Vec<String>,
    #[serde(default)]
    pub mode: RequireMode,
}

/// A sidebar menu entry. A leaf with empty `required_codes` is visible to
/// everyone; a group heading stays visible while any of its children
/// survive filtering, so permitted leaves remain reachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub title: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub required_codes: Vec<String>,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

// ---------- API request/response types ----------

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Absent when the caller is unauthenticated.
    pub user: Option<User>,
    /// Codes required for the guarded view; empty means unconditional.
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub mode: RequireMode,
    /// Where to send a denied caller instead of rendering in place.
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
    /// `"allowed"`, `"denied"`, or `"redirected"`.
    pub decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RouteCheckRequest {
    /// e.g. "/assets"
    pub route: String,
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct RouteCheckResponse {
    pub allowed: bool,
    /// Login target for unauthenticated callers, forbidden target for
    /// callers missing the mapped permissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// Sorted for stable output.
    pub permissions: Vec<String>,
    pub admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct TreeRequest {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub roots: Vec<TreeNode>,
}

#[derive(Debug, Deserialize)]
pub struct MenusRequest {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MenusResponse {
    pub menus: Vec<MenuItem>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub roles: usize,
    pub routes: usize,
}
