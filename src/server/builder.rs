//! Server builder and run_server function
//!
//! This module wires configuration into a limiter, an admission gate and
//! finally a running [`HttpServer`].

use crate::config::{Config, ServeMode, StoreBackend};
use crate::core::identity::HeaderKeyResolver;
use crate::core::rate_limiter::{RateLimiter, TokenBucketLimiter};
use crate::server::gate::AdmissionGate;
use crate::server::server::HttpServer;
use crate::storage::{MemoryBucketStore, RedisBucketStore, RedisPool};
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the limiter over the configured bucket store
///
/// The Redis backend is pinged once; failing to reach it aborts startup.
pub async fn build_limiter(config: &Config) -> Result<Arc<dyn RateLimiter>> {
    let options = config.limiter_options();

    let limiter: Arc<dyn RateLimiter> = match config.storage.backend {
        StoreBackend::Redis => {
            let pool = RedisPool::new(&config.storage.redis).await?;
            pool.health_check().await.map_err(|e| {
                GatewayError::unavailable(format!("redis health check failed: {}", e))
            })?;
            info!(redis = ?pool, "Connected to Redis");
            Arc::new(TokenBucketLimiter::new(RedisBucketStore::new(pool), options)?)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory bucket store, limits are not shared between instances");
            Arc::new(TokenBucketLimiter::new(MemoryBucketStore::new(), options)?)
        }
    };

    info!(
        limit = config.rate_limit.limit,
        burst = config.rate_limit.burst,
        window = ?config.rate_limit.window,
        fail_mode = ?config.rate_limit.fail_mode,
        "Rate limiter ready"
    );
    Ok(limiter)
}

/// Build the admission gate: limiter plus the configured key resolver
pub async fn build_gate(config: &Config) -> Result<AdmissionGate> {
    let resolver = HeaderKeyResolver::new(&config.rate_limit.key_header)?;
    let limiter = build_limiter(config).await?;
    Ok(AdmissionGate::with_resolver(limiter, Arc::new(resolver)))
}

/// Server builder for easier configuration
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    mode: Option<ServeMode>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the surface to serve, the demo API by default
    pub fn with_mode(mut self, mode: ServeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::config("Configuration is required"))?;
        let mode = self.mode.unwrap_or(ServeMode::Api);

        config.validate_for(mode)?;
        HttpServer::new(mode, &config).await
    }
}

/// Build and run the server for `mode` until shutdown
pub async fn run_server(mode: ServeMode, config: Config) -> Result<()> {
    info!(
        version = crate::VERSION,
        git_hash = crate::build_info().git_hash,
        %mode,
        "Starting rate limit gateway"
    );

    ServerBuilder::new()
        .with_config(config)
        .with_mode(mode)
        .build()
        .await?
        .start()
        .await
}
