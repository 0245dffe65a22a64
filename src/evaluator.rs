//! Membership checks over a resolved [`PermissionSet`], plus route and menu
//! gating built on them.

use std::collections::HashMap;

use crate::catalog::permission_code;
use crate::types::{MenuItem, PermissionSet, RequireMode, RouteRule};

/// Does the set contain this exact code?
pub fn has(set: &PermissionSet, code: &str) -> bool {
    set.contains(code)
}

/// True iff at least one of `codes` is in the set.
///
/// Vacuously **false** for an empty `codes` list: "no requirement" is
/// expressed by the caller skipping the check (the guard short-circuits an
/// empty requirement before this is consulted), never by passing `[]`.
pub fn has_any(set: &PermissionSet, codes: &[String]) -> bool {
    codes.iter().any(|code| set.contains(code))
}

/// True iff every one of `codes` is in the set. Vacuously **true** for an
/// empty `codes` list.
pub fn has_all(set: &PermissionSet, codes: &[String]) -> bool {
    codes.iter().all(|code| set.contains(code))
}

/// Sugar for `has(set, "<module>:<action>")`.
pub fn module_check(set: &PermissionSet, module: &str, action: &str) -> bool {
    has(set, &permission_code(module, action))
}

/// Gate a route against the static route table.
///
/// A route with no entry in the table is **allowed** — unmapped routes are
/// deliberately fail-open, so the route table only needs rows for protected
/// paths. Contrast with the guard, which fails closed on a missing user.
pub fn route_allowed(
    route: &str,
    set: &PermissionSet,
    rules: &HashMap<String, RouteRule>,
) -> bool {
    let Some(rule) = rules.get(route) else {
        return true;
    };
    match rule.mode {
        RequireMode::Any => has_any(set, &rule.required_codes),
        RequireMode::All => has_all(set, &rule.required_codes),
    }
}

/// Filter a menu tree down to what the permission set may see.
///
/// A leaf survives when it requires nothing or `has_any` passes. A group
/// heading carries no content of its own: it survives while any child does
/// (so permitted children stay reachable), or when it passes an explicit
/// requirement of its own. Group headings without surviving children
/// disappear rather than rendering empty.
pub fn filter_menus(menus: &[MenuItem], set: &PermissionSet) -> Vec<MenuItem> {
    menus
        .iter()
        .filter_map(|item| {
            let children = filter_menus(&item.children, set);
            let permitted = if item.children.is_empty() {
                item.required_codes.is_empty() || has_any(set, &item.required_codes)
            } else {
                !item.required_codes.is_empty() && has_any(set, &item.required_codes)
            };
            if permitted || !children.is_empty() {
                Some(MenuItem {
                    title: item.title.clone(),
                    path: item.path.clone(),
                    required_codes: item.required_codes.clone(),
                    children,
                })
            } else {
                None
            }
        })
        .collect()
}
