//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use tailgate_core::error::{Result, TailgateError};

pub use schema::{AclRuleConfig, GatewayConfig, OpsSection, ServerSection, TlsSection};

/// Env var naming the config file; falls back to [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "TAILGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "tailgate.yaml";

pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TailgateError::BadConfig(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| TailgateError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
