//! Permission-code semantics and user -> permission-set resolution.
//!
//! Codes are module-scoped strings of the shape `"<module>:<action>"`,
//! e.g. `asset:view`. Resolution is a pure function of the user's role
//! assignments and the role table passed in, so a role edit takes effect on
//! the next evaluation with no propagation step.

use std::collections::{HashMap, HashSet};

use crate::types::{Node, PermissionSet, Role, Status, User};

/// Canonical permission codes of the admin console.
pub mod codes {
    /// Reserved role code granting the admin short-circuit in [`super::is_admin`].
    pub const ADMIN_ROLE: &str = "admin";

    pub const ASSET_VIEW: &str = "asset:view";
    pub const ASSET_CREATE: &str = "asset:create";
    pub const ASSET_UPDATE: &str = "asset:update";
    pub const ASSET_DELETE: &str = "asset:delete";

    pub const BUILDING_VIEW: &str = "building:view";
    pub const BUILDING_CREATE: &str = "building:create";
    pub const BUILDING_UPDATE: &str = "building:update";
    pub const BUILDING_DELETE: &str = "building:delete";

    pub const FLOOR_VIEW: &str = "floor:view";
    pub const FLOOR_CREATE: &str = "floor:create";
    pub const FLOOR_UPDATE: &str = "floor:update";
    pub const FLOOR_DELETE: &str = "floor:delete";

    pub const ROOM_VIEW: &str = "room:view";
    pub const ROOM_CREATE: &str = "room:create";
    pub const ROOM_UPDATE: &str = "room:update";
    pub const ROOM_DELETE: &str = "room:delete";

    pub const USER_VIEW: &str = "user:view";
    pub const USER_CREATE: &str = "user:create";
    pub const USER_UPDATE: &str = "user:update";
    pub const USER_DELETE: &str = "user:delete";

    pub const ROLE_VIEW: &str = "role:view";
    pub const ROLE_CREATE: &str = "role:create";
    pub const ROLE_UPDATE: &str = "role:update";
    pub const ROLE_DELETE: &str = "role:delete";

    pub const PERMISSION_VIEW: &str = "permission:view";
    pub const PERMISSION_UPDATE: &str = "permission:update";

    pub const ORG_VIEW: &str = "org:view";
    pub const ORG_CREATE: &str = "org:create";
    pub const ORG_UPDATE: &str = "org:update";
    pub const ORG_DELETE: &str = "org:delete";

    pub const ANALYTICS_VIEW: &str = "analytics:view";
    pub const MAP_VIEW: &str = "map:view";
    pub const SYSTEM_CONFIG: &str = "system:config";
}

/// Union the permission codes of every assigned role that exists in the
/// table and is active. Unknown role ids are skipped — a role may have been
/// deleted after assignment. Inactive roles contribute nothing.
pub fn resolve_permissions(user: &User, roles: &HashMap<i64, Role>) -> PermissionSet {
    let mut set = PermissionSet::new();
    for role_id in &user.role_ids {
        let Some(role) = roles.get(role_id) else {
            continue;
        };
        if role.status != Status::Active {
            continue;
        }
        set.extend(role.permission_codes.iter().cloned());
    }
    set
}

/// True iff any assigned active role carries the reserved `"admin"` code.
pub fn is_admin(user: &User, roles: &HashMap<i64, Role>) -> bool {
    user.role_ids.iter().any(|id| {
        roles
            .get(id)
            .is_some_and(|r| r.status == Status::Active && r.code == codes::ADMIN_ROLE)
    })
}

/// Build the `"<module>:<action>"` form of a permission code.
pub fn permission_code(module: &str, action: &str) -> String {
    format!("{module}:{action}")
}

/// Ancestor codes of the permission node with the given code, root-first and
/// excluding the node itself. Used for menu highlighting: selecting a leaf
/// opens every ancestor group.
///
/// The walk follows `parent_id` links over the flat collection with a
/// visited set, so corrupted cyclic links terminate; a dangling parent or an
/// unknown code ends the walk early.
pub fn ancestor_codes(nodes: &[Node], code: &str) -> Vec<String> {
    // Last-seen wins on duplicate ids, same as the tree builder.
    let mut by_id: HashMap<i64, &Node> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        by_id.insert(node.id, node);
    }

    let Some(start) = nodes.iter().find(|n| n.code == code) else {
        return Vec::new();
    };

    let mut visited: HashSet<i64> = HashSet::from([start.id]);
    let mut chain = Vec::new();
    let mut current = start.parent_id;
    while let Some(id) = current {
        let Some(parent) = by_id.get(&id) else {
            break;
        };
        if !visited.insert(id) {
            break;
        }
        chain.push(parent.code.clone());
        current = parent.parent_id;
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i64, code: &str, perms: &[&str], status: Status) -> Role {
        Role {
            id,
            code: code.into(),
            name: code.into(),
            permission_codes: perms.iter().map(|p| p.to_string()).collect(),
            status,
        }
    }

    fn user(role_ids: &[i64]) -> User {
        User {
            id: 42,
            role_ids: role_ids.iter().copied().collect(),
        }
    }

    fn table(roles: Vec<Role>) -> HashMap<i64, Role> {
        roles.into_iter().map(|r| (r.id, r)).collect()
    }

    #[test]
    fn test_resolve_unions_active_roles() {
        let roles = table(vec![
            role(1, "manager", &[codes::ASSET_VIEW, codes::ASSET_CREATE], Status::Active),
            role(2, "viewer", &[codes::ASSET_VIEW, codes::MAP_VIEW], Status::Active),
        ]);
        let set = resolve_permissions(&user(&[1, 2]), &roles);
        assert_eq!(set.len(), 3);
        assert!(set.contains(codes::ASSET_CREATE));
        assert!(set.contains(codes::MAP_VIEW));
    }

    #[test]
    fn test_inactive_role_contributes_nothing() {
        let roles = table(vec![role(1, "manager", &[codes::ASSET_VIEW], Status::Inactive)]);
        assert!(resolve_permissions(&user(&[1]), &roles).is_empty());
    }

    #[test]
    fn test_unknown_role_id_is_skipped() {
        let roles = table(vec![role(1, "viewer", &[codes::ASSET_VIEW], Status::Active)]);
        let set = resolve_permissions(&user(&[1, 999]), &roles);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_resolution_is_order_independent() {
        let roles = table(vec![
            role(1, "a", &["x:view", "y:view"], Status::Active),
            role(2, "b", &["y:view", "z:view"], Status::Active),
        ]);
        let forward = resolve_permissions(&user(&[1, 2]), &roles);
        let backward = resolve_permissions(&user(&[2, 1]), &roles);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let roles = table(vec![role(1, "viewer", &[codes::MAP_VIEW], Status::Active)]);
        let u = user(&[1]);
        assert_eq!(
            resolve_permissions(&u, &roles),
            resolve_permissions(&u, &roles)
        );
    }

    #[test]
    fn test_is_admin() {
        let roles = table(vec![
            role(1, "admin", &[], Status::Active),
            role(2, "admin", &[], Status::Inactive),
            role(3, "viewer", &[codes::ASSET_VIEW], Status::Active),
        ]);
        assert!(is_admin(&user(&[1]), &roles));
        // An inactive admin role does not count.
        assert!(!is_admin(&user(&[2]), &roles));
        assert!(!is_admin(&user(&[3]), &roles));
        assert!(!is_admin(&user(&[]), &roles));
    }

    #[test]
    fn test_permission_code_shape() {
        assert_eq!(permission_code("asset", "view"), "asset:view");
    }

    fn perm_node(id: i64, parent_id: Option<i64>, code: &str) -> Node {
        Node {
            id,
            parent_id,
            name: code.into(),
            code: code.into(),
            kind: "menu".into(),
            status: Status::Active,
        }
    }

    #[test]
    fn test_ancestor_codes_root_first() {
        let nodes = vec![
            perm_node(1, None, "system"),
            perm_node(2, Some(1), "system:users"),
            perm_node(3, Some(2), "user:view"),
        ];
        assert_eq!(
            ancestor_codes(&nodes, "user:view"),
            vec!["system", "system:users"]
        );
        assert!(ancestor_codes(&nodes, "system").is_empty());
    }

    #[test]
    fn test_ancestor_codes_tolerates_gaps_and_cycles() {
        assert!(ancestor_codes(&[], "missing").is_empty());

        // Dangling parent ends the walk.
        let dangling = vec![perm_node(5, Some(99), "orphan")];
        assert!(ancestor_codes(&dangling, "orphan").is_empty());

        // Cyclic links terminate instead of looping.
        let cyclic = vec![
            perm_node(1, Some(2), "a"),
            perm_node(2, Some(1), "b"),
        ];
        assert_eq!(ancestor_codes(&cyclic, "a"), vec!["b"]);
    }
}
