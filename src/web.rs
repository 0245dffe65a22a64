//! HTTP surface of the decision service. A thin adapter: all semantics
//! live in the pure core modules (`tree`, `catalog`, `evaluator`, `guard`).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use miette::IntoDiagnostic;

use crate::catalog::{is_admin, resolve_permissions};
use crate::evaluator::{filter_menus, route_allowed};
use crate::guard::{self, Decision, Requirement};
use crate::loader;
use crate::settings::Settings;
use crate::snapshot::StateCell;
use crate::tree::build_forest;
use crate::types::{
    CheckRequest, CheckResponse, MenusRequest, MenusResponse, ReloadResponse, ResolveRequest,
    ResolveResponse, RouteCheckRequest, RouteCheckResponse, TreeRequest, TreeResponse,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub cell: Arc<StateCell>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/check", post(handle_check))
        .route("/v1/routes/check", post(handle_route_check))
        .route("/v1/permissions/resolve", post(handle_resolve))
        .route("/v1/tree", post(handle_tree))
        .route("/v1/menus", post(handle_menus))
        .route("/v1/reload", post(handle_reload))
        .route("/healthz", get(health))
        .with_state(state)
}

async fn handle_check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> impl IntoResponse {
    let access = state.cell.current();
    let requirement = Requirement {
        codes: req.required,
        mode: req.mode,
        redirect: req.redirect,
    };
    let decision = guard::evaluate(
        req.user.as_ref(),
        &access.roles,
        &requirement,
        &state.settings.access.login_redirect,
    );
    Json(decision_response(decision))
}

fn decision_response(decision: Decision) -> CheckResponse {
    match decision {
        Decision::Allowed => CheckResponse {
            allowed: true,
            decision: "allowed",
            redirect: None,
        },
        Decision::Denied => CheckResponse {
            allowed: false,
            decision: "denied",
            redirect: None,
        },
        Decision::Redirected { target } => CheckResponse {
            allowed: false,
            decision: "redirected",
            redirect: Some(target),
        },
    }
}

/// Route gate, mirroring the console's `PrivateRoute`: an unauthenticated
/// caller is sent to the login page, a caller without the mapped permissions
/// to the forbidden page. Unmapped routes stay fail-open for authenticated
/// callers.
async fn handle_route_check(
    State(state): State<AppState>,
    Json(req): Json<RouteCheckRequest>,
) -> impl IntoResponse {
    let access = state.cell.current();
    let Some(user) = req.user.as_ref() else {
        return Json(RouteCheckResponse {
            allowed: false,
            redirect: Some(state.settings.access.login_redirect.clone()),
        });
    };
    let set = resolve_permissions(user, &access.roles);
    if route_allowed(&req.route, &set, &access.routes) {
        Json(RouteCheckResponse {
            allowed: true,
            redirect: None,
        })
    } else {
        Json(RouteCheckResponse {
            allowed: false,
            redirect: Some(state.settings.access.forbidden_redirect.clone()),
        })
    }
}

async fn handle_resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> impl IntoResponse {
    let access = state.cell.current();
    let set = resolve_permissions(&req.user, &access.roles);
    let admin = is_admin(&req.user, &access.roles);
    let mut permissions: Vec<String> = set.into_iter().collect();
    permissions.sort();
    Json(ResolveResponse { permissions, admin })
}

async fn handle_tree(Json(req): Json<TreeRequest>) -> impl IntoResponse {
    Json(TreeResponse {
        roots: build_forest(req.nodes),
    })
}

async fn handle_menus(
    State(state): State<AppState>,
    Json(req): Json<MenusRequest>,
) -> impl IntoResponse {
    let access = state.cell.current();
    let set = resolve_permissions(&req.user, &access.roles);
    Json(MenusResponse {
        menus: filter_menus(&access.menus, &set),
    })
}

/// Explicit invalidation signal: re-read the policy directory and install
/// the result as the new snapshot. In-flight evaluations keep the snapshot
/// they started with.
async fn handle_reload(State(state): State<AppState>) -> impl IntoResponse {
    match loader::load_policies(&state.settings.access.policies_dir) {
        Ok(fresh) => {
            let response = ReloadResponse {
                roles: fresh.roles.len(),
                routes: fresh.routes.len(),
            };
            state.cell.install(fresh);
            tracing::info!(
                roles = response.roles,
                routes = response.routes,
                "Reloaded access policies"
            );
            Json(response).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn serve(settings: Settings, cell: StateCell) -> miette::Result<()> {
    let state = AppState {
        settings: Arc::new(settings),
        cell: Arc::new(cell),
    };

    let addr: SocketAddr = state
        .settings
        .listen_addr()
        .parse()
        .map_err(|e| miette::miette!("bad listen addr: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    tracing::info!(%addr, "Access decision service listening");
    axum::serve(listener, router(state)).await.into_diagnostic()?;
    Ok(())
}
