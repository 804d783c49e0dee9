//! Redis connection management
//!
//! This module provides Redis connectivity and health checks.

use crate::config::RedisConfig;
use crate::utils::error::{GatewayError, Result};
use redis::Client;
use redis::aio::ConnectionManager;
use std::fmt;
use tracing::{debug, info};

/// Redis client plus a shared, auto-reconnecting multiplexed connection
#[derive(Clone)]
pub struct RedisPool {
    /// Redis client
    pub(crate) client: Client,
    /// Connection manager, cheap to clone per call
    pub(crate) connection_manager: ConnectionManager,
    /// Configuration
    pub(crate) config: RedisConfig,
}

impl fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &Self::sanitize_url(&self.config.connection_url()))
            .finish()
    }
}

impl RedisPool {
    /// Connect to Redis
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let url = config.connection_url();
        info!("Creating Redis connection");
        debug!("Redis URL: {}", Self::sanitize_url(&url));

        let client = Client::open(url.as_str()).map_err(GatewayError::Redis)?;

        let connection_manager =
            tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client.clone()))
                .await
                .map_err(|_| {
                    GatewayError::unavailable(format!(
                        "Redis at {} did not answer within {:?}",
                        Self::sanitize_url(&url),
                        config.connect_timeout
                    ))
                })?
                .map_err(GatewayError::Redis)?;

        info!("Redis connection created successfully");
        Ok(Self {
            client,
            connection_manager,
            config: config.clone(),
        })
    }

    /// Get a handle to the shared connection
    pub fn connection(&self) -> ConnectionManager {
        self.connection_manager.clone()
    }

    /// Get the pool configuration
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");

        let mut conn = self.connection();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(GatewayError::Redis)?;

        debug!("Redis health check passed");
        Ok(())
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}
