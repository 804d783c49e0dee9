//! Configuration management for the gateway
//!
//! Configuration is layered: built-in defaults, an optional YAML file, then
//! environment variables and command-line flags (see [`cli`]).

pub mod cli;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::core::rate_limiter::LimiterOptions;
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// The result is not validated; overrides are usually applied first.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Limiter parameters described by this configuration
    pub fn limiter_options(&self) -> LimiterOptions {
        self.rate_limit.limiter_options()
    }

    /// Validate the sections used by `mode`
    pub fn validate_for(&self, mode: ServeMode) -> Result<()> {
        debug!(%mode, "Validating configuration");

        self.server
            .validate()
            .map_err(|e| GatewayError::Config(format!("Server config error: {}", e)))?;
        self.rate_limit
            .validate()
            .map_err(|e| GatewayError::Config(format!("Rate limit config error: {}", e)))?;
        self.storage
            .validate()
            .map_err(|e| GatewayError::Config(format!("Storage config error: {}", e)))?;
        self.logging
            .validate()
            .map_err(|e| GatewayError::Config(format!("Logging config error: {}", e)))?;

        if mode == ServeMode::Proxy {
            self.proxy
                .validate()
                .map_err(|e| GatewayError::Config(format!("Proxy config error: {}", e)))?;
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
