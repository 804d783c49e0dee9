//! # ratelimit-gateway
//!
//! Distributed HTTP request-rate limiting shared across stateless service instances.
//!
//! Every instance evaluates the same token bucket, stored in Redis and updated by a
//! single server-side Lua script, so the answer for a caller does not depend on which
//! instance handles the request.
//!
//! ## Features
//!
//! - **Atomic token bucket**: one round trip per request, no client-side locking
//! - **Identity resolution**: API key header, bearer token, forwarded-for, peer address
//! - **Fail-open / fail-closed** degradation when the shared store is unreachable
//! - **Two integration surfaces**: actix-web middleware and a standalone reverse proxy
//!
//! ## Middleware Mode
//!
//! ```rust,no_run
//! use actix_web::{App, HttpServer, web};
//! use ratelimit_gateway::core::rate_limiter::{LimiterOptions, TokenBucketLimiter};
//! use ratelimit_gateway::server::{AdmissionGate, RateLimitMiddleware};
//! use ratelimit_gateway::storage::MemoryBucketStore;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let limiter = TokenBucketLimiter::new(
//!         MemoryBucketStore::new(),
//!         LimiterOptions::new(100, Duration::from_secs(60)),
//!     )?;
//!     let gate = AdmissionGate::new(Arc::new(limiter));
//!
//!     HttpServer::new(move || {
//!         App::new()
//!             .wrap(RateLimitMiddleware::new(gate.clone()))
//!             .route("/", web::get().to(|| async { "hello" }))
//!     })
//!     .bind("127.0.0.1:8081")?
//!     .run()
//!     .await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp (epoch seconds)
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
        }
    }
}

/// Build information baked in by `build.rs`
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
