// gateway/src/config.rs

use serde::Deserialize;

use models::{HmsError, HmsResult};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the hosted Gateway, layered from an optional
/// `hms.toml` next to the working directory and `HMS_*` environment
/// variables (`HMS_BASE_URL`, `HMS_API_KEY`, `HMS_TIMEOUT_SECS`).
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl GatewayConfig {
    pub fn load() -> HmsResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("hms").required(false))
            .add_source(config::Environment::with_prefix("HMS"))
            .build()
            .map_err(|e| HmsError::Config(format!("Failed to read configuration: {}", e)))?;

        let cfg: GatewayConfig = settings
            .try_deserialize()
            .map_err(|e| HmsError::Config(format!("Invalid configuration: {}", e)))?;
        cfg.validated()
    }

    fn validated(self) -> HmsResult<Self> {
        if self.base_url.trim().is_empty() {
            return Err(HmsError::Config(
                "Gateway base URL is not set (HMS_BASE_URL)".to_string(),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(HmsError::Config(
                "Gateway API key is not set (HMS_API_KEY)".to_string(),
            ));
        }
        Ok(self)
    }

    /// Fixed settings for tests and tools that already know the endpoint.
    pub fn with_values(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        GatewayConfig {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
