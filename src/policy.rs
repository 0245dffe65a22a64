//! KDL policy document parsing.
//!
//! Policy files carry the data-driven role table, the route -> required
//! permissions table, and the sidebar menu tree:
//!
//! ```kdl
//! role "manager" id=2 name="Manager" status="active" {
//!     permissions {
//!         - "asset:view"
//!         - "asset:create"
//!     }
//! }
//!
//! route "/assets" {
//!     required {
//!         - "asset:view"
//!     }
//!     mode "any"
//! }
//!
//! menu "System" {
//!     menu "Users" path="/system/users" {
//!         required {
//!             - "user:view"
//!         }
//!     }
//! }
//! ```

use crate::errors::AccessError;
use crate::types::{MenuItem, RequireMode, Role, RouteRule, Status};
use kdl::KdlDocument;

/// Intermediate result from parsing a single KDL file.
#[derive(Debug, Clone, Default)]
pub struct ParsedAccessDoc {
    pub roles: Vec<Role>,
    pub routes: Vec<RouteRule>,
    pub menus: Vec<MenuItem>,
}

/// Parse a KDL document string into typed policy structs.
pub fn parse_kdl_document(source: &str) -> Result<ParsedAccessDoc, AccessError> {
    let doc: KdlDocument = source
        .parse()
        .map_err(|e: kdl::KdlError| AccessError::KdlParse(e.to_string()))?;

    let mut parsed = ParsedAccessDoc::default();

    for node in doc.nodes() {
        match node.name().value() {
            "role" => {
                let code = first_string_arg(node).ok_or_else(|| {
                    AccessError::InvalidPolicy(
                        "role node requires a string argument (e.g. role \"manager\")".into(),
                    )
                })?;

                let id = node
                    .get("id")
                    .and_then(|v| v.as_integer())
                    .ok_or_else(|| {
                        AccessError::InvalidPolicy(format!(
                            "role `{code}` requires an integer id property (e.g. role \"{code}\" id=2)"
                        ))
                    })? as i64;

                let name = node
                    .get("name")
                    .and_then(|v| v.as_string())
                    .unwrap_or(&code)
                    .to_string();

                let status = parse_status(
                    node.get("status")
                        .and_then(|v| v.as_string())
                        .unwrap_or("active"),
                )?;

                let mut permissions = Vec::new();
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        match child.name().value() {
                            "permissions" => {
                                permissions = dash_list(child);
                            }
                            other => {
                                return Err(AccessError::InvalidPolicy(format!(
                                    "unexpected child `{other}` in role `{code}` (expected `permissions`)"
                                )));
                            }
                        }
                    }
                }

                parsed.roles.push(Role {
                    id,
                    code,
                    name,
                    permission_codes: permissions.into_iter().collect(),
                    status,
                });
            }
            "route" => {
                let path = first_string_arg(node).ok_or_else(|| {
                    AccessError::InvalidPolicy(
                        "route node requires a string argument (e.g. route \"/assets\")".into(),
                    )
                })?;

                let mut required = Vec::new();
                let mut mode = RequireMode::Any;

                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        match child.name().value() {
                            "required" => {
                                required = dash_list(child);
                            }
                            "mode" => {
                                let raw = first_string_arg(child).ok_or_else(|| {
                                    AccessError::InvalidPolicy(format!(
                                        "mode in route `{path}` requires a string argument"
                                    ))
                                })?;
                                mode = parse_mode(&raw)?;
                            }
                            other => {
                                return Err(AccessError::InvalidPolicy(format!(
                                    "unexpected child `{other}` in route `{path}` (expected `required` or `mode`)"
                                )));
                            }
                        }
                    }
                }

                parsed.routes.push(RouteRule {
                    route_path: path,
                    required_codes: required,
                    mode,
                });
            }
            "menu" => {
                parsed.menus.push(parse_menu(node)?);
            }
            other => {
                // Ignore comments and unknown top-level nodes with a warning
                tracing::warn!("ignoring unknown top-level KDL node `{other}`");
            }
        }
    }

    Ok(parsed)
}

/// Parse a `menu` node, recursing into nested `menu` children.
fn parse_menu(node: &kdl::KdlNode) -> Result<MenuItem, AccessError> {
    let title = first_string_arg(node).ok_or_else(|| {
        AccessError::InvalidPolicy(
            "menu node requires a string argument (e.g. menu \"Assets\")".into(),
        )
    })?;

    let path = node
        .get("path")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string());

    let mut required = Vec::new();
    let mut children = Vec::new();

    if let Some(doc) = node.children() {
        for child in doc.nodes() {
            match child.name().value() {
                "required" => {
                    required = dash_list(child);
                }
                "menu" => {
                    children.push(parse_menu(child)?);
                }
                other => {
                    return Err(AccessError::InvalidPolicy(format!(
                        "unexpected child `{other}` in menu `{title}` (expected `required` or `menu`)"
                    )));
                }
            }
        }
    }

    Ok(MenuItem {
        title,
        path,
        required_codes: required,
        children,
    })
}

fn parse_status(raw: &str) -> Result<Status, AccessError> {
    match raw {
        "active" => Ok(Status::Active),
        "inactive" => Ok(Status::Inactive),
        other => Err(AccessError::InvalidPolicy(format!(
            "unknown status `{other}` (expected \"active\" or \"inactive\")"
        ))),
    }
}

fn parse_mode(raw: &str) -> Result<RequireMode, AccessError> {
    match raw {
        "any" => Ok(RequireMode::Any),
        "all" => Ok(RequireMode::All),
        other => Err(AccessError::InvalidPolicy(format!(
            "unknown mode `{other}` (expected \"any\" or \"all\")"
        ))),
    }
}

/// Extract the first string argument from a KDL node.
fn first_string_arg(node: &kdl::KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Extract dash-list children: nodes named "-" whose first argument is a string.
/// Example KDL:
/// ```kdl
/// permissions {
///     - "asset:view"
///     - "asset:create"
/// }
/// ```
fn dash_list(node: &kdl::KdlNode) -> Vec<String> {
    let Some(children) = node.children() else {
        return Vec::new();
    };
    children
        .nodes()
        .iter()
        .filter(|n| n.name().value() == "-")
        .filter_map(|n| first_string_arg(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        let kdl = r#"
role "manager" id=2 name="Manager" {
    permissions {
        - "asset:view"
        - "asset:create"
    }
}
"#;
        let parsed = parse_kdl_document(kdl).unwrap();
        assert_eq!(parsed.roles.len(), 1);
        let role = &parsed.roles[0];
        assert_eq!(role.id, 2);
        assert_eq!(role.code, "manager");
        assert_eq!(role.name, "Manager");
        assert_eq!(role.status, Status::Active);
        assert!(role.permission_codes.contains("asset:create"));
    }

    #[test]
    fn test_parse_role_inactive() {
        let kdl = r#"role "legacy" id=9 status="inactive""#;
        let parsed = parse_kdl_document(kdl).unwrap();
        assert_eq!(parsed.roles[0].status, Status::Inactive);
        assert!(parsed.roles[0].permission_codes.is_empty());
    }

    #[test]
    fn test_role_requires_id() {
        let err = parse_kdl_document(r#"role "manager""#).unwrap_err();
        assert!(matches!(err, AccessError::InvalidPolicy(_)));
    }

    #[test]
    fn test_parse_route() {
        let kdl = r#"
route "/assets" {
    required {
        - "asset:view"
    }
    mode "any"
}
"#;
        let parsed = parse_kdl_document(kdl).unwrap();
        assert_eq!(parsed.routes.len(), 1);
        let route = &parsed.routes[0];
        assert_eq!(route.route_path, "/assets");
        assert_eq!(route.required_codes, vec!["asset:view"]);
        assert_eq!(route.mode, RequireMode::Any);
    }

    #[test]
    fn test_route_mode_all() {
        let kdl = r#"
route "/system/settings" {
    required {
        - "system:config"
        - "user:view"
    }
    mode "all"
}
"#;
        let parsed = parse_kdl_document(kdl).unwrap();
        assert_eq!(parsed.routes[0].mode, RequireMode::All);
    }

    #[test]
    fn test_parse_nested_menu() {
        let kdl = r#"
menu "System" {
    menu "Users" path="/system/users" {
        required {
            - "user:view"
        }
    }
    menu "Roles" path="/system/roles" {
        required {
            - "role:view"
        }
    }
}
"#;
        let parsed = parse_kdl_document(kdl).unwrap();
        assert_eq!(parsed.menus.len(), 1);
        let system = &parsed.menus[0];
        assert_eq!(system.title, "System");
        assert!(system.path.is_none());
        assert!(system.required_codes.is_empty());
        assert_eq!(system.children.len(), 2);
        assert_eq!(system.children[0].path.as_deref(), Some("/system/users"));
    }

    #[test]
    fn test_unexpected_child_is_rejected() {
        let kdl = r#"
role "manager" id=2 {
    includes {
        - "viewer"
    }
}
"#;
        let err = parse_kdl_document(kdl).unwrap_err();
        assert!(err.to_string().contains("unexpected child"));
    }

    #[test]
    fn test_unknown_top_level_node_is_ignored() {
        let parsed = parse_kdl_document(r#"banner "hello""#).unwrap();
        assert!(parsed.roles.is_empty());
        assert!(parsed.routes.is_empty());
    }

    #[test]
    fn test_bad_kdl_syntax() {
        let err = parse_kdl_document("role \"unterminated").unwrap_err();
        assert!(matches!(err, AccessError::KdlParse(_)));
    }
}
