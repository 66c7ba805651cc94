//! Node configuration with TOML file support.

use crate::error::NodeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a vouch node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Server-held secret keying credential signatures and access tokens.
    /// Must be set per deployment; the default exists only for dev runs.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Port for the realtime WebSocket server.
    #[serde(default = "default_ws_port")]
    pub websocket_port: u16,

    /// When true, scanned credentials are also checked against the
    /// authoritative status, so invalidated/closed credentials are
    /// rejected even though their signature verifies. When false,
    /// validation is offline (signature + expiry only) with the
    /// documented consistency gap.
    #[serde(default = "default_true")]
    pub strict_validation: bool,

    /// Retained audit events before the oldest are dropped.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            websocket_port: default_ws_port(),
            strict_validation: default_true(),
            audit_capacity: default_audit_capacity(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl NodeConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| NodeError::Config(format!("parse {}: {e}", path.display())))
    }
}

fn default_secret() -> String {
    "dev-only-insecure-secret".to_string()
}

fn default_ws_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_audit_capacity() -> usize {
    vouch_audit::DEFAULT_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config: NodeConfig = toml::from_str("secret = \"s3cret\"").unwrap();
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.websocket_port, 8080);
        assert!(config.strict_validation);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn full_file_parses() {
        let config: NodeConfig = toml::from_str(
            r#"
            secret = "prod-secret"
            websocket_port = 9090
            strict_validation = false
            audit_capacity = 500
            log_level = "debug"
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.websocket_port, 9090);
        assert!(!config.strict_validation);
        assert_eq!(config.audit_capacity, 500);
        assert_eq!(config.log_format, "json");
    }
}
