use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AccessError {
    #[error("Failed to load policy file `{path}`")]
    #[diagnostic(
        code(doorman::policy_load),
        help("Check that the file exists and contains valid KDL syntax")
    )]
    PolicyLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid policy: {0}")]
    #[diagnostic(
        code(doorman::invalid_policy),
        help("Each policy file must contain valid `role`, `route`, or `menu` KDL nodes")
    )]
    InvalidPolicy(String),

    #[error("Invalid permission code `{0}`")]
    #[diagnostic(
        code(doorman::invalid_code),
        help("Permission codes are module-scoped: \"<module>:<action>\", e.g. \"asset:view\"")
    )]
    InvalidCode(String),

    #[error("KDL parse error: {0}")]
    #[diagnostic(
        code(doorman::kdl_parse),
        help("Check your KDL file syntax — see https://kdl.dev for the specification")
    )]
    KdlParse(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(doorman::io))]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AccessError::InvalidPolicy(_)
            | AccessError::InvalidCode(_)
            | AccessError::KdlParse(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        let body = json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
