//! Application configuration.
//!
//! Defaults, then `TODO_`-prefixed environment variables
//! (`TODO_API_URL`, `TODO_TOAST_MS`, `TODO_LOG_LEVEL`). Command-line flags
//! are applied on top by the binary.

use std::time::Duration;

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the todo API.
    pub api_url: String,
    /// How long a toast stays up, in milliseconds.
    pub toast_ms: u64,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("api_url must start with http:// or https://, got `{0}`")]
    InvalidUrl(String),

    #[error("toast_ms must be greater than zero")]
    ZeroToastDuration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            toast_ms: 5000,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Env::prefixed("TODO_").only(&["api_url", "toast_ms", "log_level"]))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: AppConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }
        if self.toast_ms == 0 {
            return Err(ConfigError::ZeroToastDuration);
        }
        Ok(())
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}
