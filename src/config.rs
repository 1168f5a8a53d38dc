//! Service configuration from the environment.
//!
//! `.env` is loaded if present. CLI flags take precedence over everything read
//! here (see `app`).

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5003;
pub const DEFAULT_MODEL_PATH: &str = "models/best_model_combined.json";
pub const DEFAULT_LOG_FILTER: &str = "drug_forecast=info,tower_http=info";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();
        if let Some(host) = lookup("ML_SERVICE_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("ML_SERVICE_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::config(format!("ML_SERVICE_PORT must be a valid port, got '{port}'.")))?;
        }
        if let Some(path) = lookup("MODEL_PATH").filter(|p| !p.trim().is_empty()) {
            config.model_path = PathBuf::from(path.trim());
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::config(format!("Invalid HOST:PORT '{}:{}': {e}", self.host, self.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.socket_addr().unwrap().port(), 5003);
    }

    #[test]
    fn reads_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("ML_SERVICE_HOST", "127.0.0.1"),
            ("ML_SERVICE_PORT", " 8081 "),
            ("MODEL_PATH", "/srv/model.json"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8081");
        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let err = ServiceConfig::from_lookup(lookup(&[("ML_SERVICE_PORT", "http")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let config = ServiceConfig {
            host: "not a host".to_string(),
            ..ServiceConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
