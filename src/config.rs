use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, RuntimeError};
use crate::transport::Platform;

/// Base URL and optional development bearer token for one backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    /// Development-only fallback token. Never persisted by the token store.
    #[serde(default)]
    pub dev_token: Option<String>,
}

/// Runtime configuration, constructed once at startup and passed by
/// reference into every facade. There is no global; a facade cannot exist
/// without one.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    pub gateway: BackendConfig,
    pub commerce: BackendConfig,
    pub identity: BackendConfig,

    /// When set, every facade routes to the isolated mock runtime instead
    /// of the network.
    #[serde(default)]
    pub isolated_mock: bool,

    /// Root directory for persisted client state (token, mock snapshot).
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default = "default_platform")]
    pub platform: Platform,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".procure-state")
}

fn default_platform() -> Platform {
    Platform::Unknown
}

impl RuntimeConfig {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let mut config: RuntimeConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment wins over the file for the switches a developer flips
    /// most often.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PROCURE_ISOLATED_MOCK") {
            self.isolated_mock = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("PROCURE_STATE_DIR") {
            self.state_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("PROCURE_DEV_TOKEN") {
            self.identity.dev_token = Some(v);
        }
    }

    pub fn dev_token(&self) -> Option<&str> {
        self.identity.dev_token.as_deref()
    }

    /// Configuration for developer tooling that only ever touches the
    /// offline runtime; no backend needs to be reachable.
    pub fn offline(state_dir: PathBuf) -> Self {
        let unused = BackendConfig {
            base_url: "http://localhost:0".to_string(),
            dev_token: None,
        };
        Self {
            gateway: unused.clone(),
            commerce: unused.clone(),
            identity: unused,
            isolated_mock: true,
            state_dir,
            platform: Platform::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let toml = r#"
            [gateway]
            base_url = "https://gw.example.com"

            [commerce]
            base_url = "https://commerce.example.com"

            [identity]
            base_url = "https://id.example.com"
            dev_token = "dev-123"
        "#;
        let config: RuntimeConfig = toml::from_str(toml).unwrap();
        assert!(!config.isolated_mock);
        assert_eq!(config.dev_token(), Some("dev-123"));
        assert_eq!(config.platform, Platform::Unknown);
    }
}
