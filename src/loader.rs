use std::collections::HashMap;
use std::path::Path;

use crate::errors::AccessError;
use crate::policy::{parse_kdl_document, ParsedAccessDoc};
use crate::types::{MenuItem, Role, RouteRule};
use crate::AccessState;

/// Load all `.kdl` policy files from the given directory and compile them
/// into a single immutable `AccessState`.
pub fn load_policies(dir: &Path) -> Result<AccessState, AccessError> {
    if !dir.is_dir() {
        return Err(AccessError::InvalidPolicy(format!(
            "policies directory `{}` does not exist or is not a directory",
            dir.display()
        )));
    }

    let mut all_parsed = Vec::new();
    let mut file_count = 0;

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "kdl")
                .unwrap_or(false)
        })
        .collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        let contents =
            std::fs::read_to_string(&path).map_err(|source| AccessError::PolicyLoad {
                path: path.display().to_string(),
                source,
            })?;
        let parsed = parse_kdl_document(&contents)?;
        all_parsed.push(parsed);
        file_count += 1;
    }

    let state = compile_policies(all_parsed)?;

    tracing::info!(
        files = file_count,
        roles = state.roles.len(),
        routes = state.routes.len(),
        menus = state.menus.len(),
        "Loaded access policies"
    );

    Ok(state)
}

/// Merge and compile all parsed documents into a single `AccessState`.
/// Later documents win on duplicate role ids and route paths.
pub fn compile_policies(parsed: Vec<ParsedAccessDoc>) -> Result<AccessState, AccessError> {
    let mut roles: HashMap<i64, Role> = HashMap::new();
    let mut routes: HashMap<String, RouteRule> = HashMap::new();
    let mut menus: Vec<MenuItem> = Vec::new();

    for doc in parsed {
        for role in doc.roles {
            check_codes(role.permission_codes.iter())?;
            if let Some(previous) = roles.insert(role.id, role) {
                tracing::warn!(
                    id = previous.id,
                    code = %previous.code,
                    "duplicate role id, later definition wins"
                );
            }
        }
        for route in doc.routes {
            check_codes(route.required_codes.iter())?;
            if let Some(previous) = routes.insert(route.route_path.clone(), route) {
                tracing::warn!(
                    path = %previous.route_path,
                    "duplicate route path, later definition wins"
                );
            }
        }
        for menu in doc.menus {
            check_menu_codes(&menu)?;
            menus.push(menu);
        }
    }

    Ok(AccessState {
        roles,
        routes,
        menus,
    })
}

/// Every referenced permission code must have the `module:action` shape.
fn check_codes<'a>(codes: impl Iterator<Item = &'a String>) -> Result<(), AccessError> {
    for code in codes {
        let valid = code
            .split_once(':')
            .is_some_and(|(module, action)| {
                !module.is_empty() && !action.is_empty() && !action.contains(':')
            });
        if !valid {
            return Err(AccessError::InvalidCode(code.clone()));
        }
    }
    Ok(())
}

fn check_menu_codes(menu: &MenuItem) -> Result<(), AccessError> {
    check_codes(menu.required_codes.iter())?;
    for child in &menu.children {
        check_menu_codes(child)?;
    }
    Ok(())
}
