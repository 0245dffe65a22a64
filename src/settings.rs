use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub server: Server,
    pub access: Access,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Access {
    /// Directory of `.kdl` policy files (role table, route table, menus).
    pub policies_dir: PathBuf,
    /// Where unauthenticated callers are redirected.
    pub login_redirect: String,
    /// Default redirect target for denied page-level guards.
    pub forbidden_redirect: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8086,
        }
    }
}

impl Default for Access {
    fn default() -> Self {
        Self {
            policies_dir: PathBuf::from("policies"),
            login_redirect: "/login".to_string(),
            forbidden_redirect: "/403".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.host", Server::default().host)
            .into_diagnostic()?
            .set_default("server.port", Server::default().port)
            .into_diagnostic()?
            .set_default(
                "access.policies_dir",
                Access::default().policies_dir.to_string_lossy().to_string(),
            )
            .into_diagnostic()?
            .set_default("access.login_redirect", Access::default().login_redirect)
            .into_diagnostic()?
            .set_default(
                "access.forbidden_redirect",
                Access::default().forbidden_redirect,
            )
            .into_diagnostic()?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: DOORMAN__SERVER__PORT=9090, etc.
        builder = builder.add_source(config::Environment::with_prefix("DOORMAN").separator("__"));

        let cfg = builder.build().into_diagnostic()?;
        let mut s: Settings = cfg.try_deserialize().into_diagnostic()?;

        // Normalize the policies dir to be relative to current dir
        if s.access.policies_dir.is_relative() {
            s.access.policies_dir = std::env::current_dir()
                .into_diagnostic()?
                .join(&s.access.policies_dir);
        }

        Ok(s)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
