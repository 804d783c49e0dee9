//! Error type definitions

use crate::core::identity::IdentityError;
use crate::core::rate_limiter::LimiterError;
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Rate limiter errors
    #[error("Rate limiter error: {0}")]
    Limiter(#[from] LimiterError),

    /// Identity resolution errors
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Upstream forwarding errors
    #[error("Upstream error: {0}")]
    Upstream(#[from] reqwest::Error),

    /// A dependency is unreachable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}
