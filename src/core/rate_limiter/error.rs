//! Rate limiter error types

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a [`RateLimiter`](super::RateLimiter)
#[derive(Error, Debug)]
pub enum LimiterError {
    /// Limiter parameters rejected at construction
    #[error("invalid rate limiter configuration: {0}")]
    InvalidConfig(String),

    /// Caller passed an empty key
    #[error("empty rate limit key")]
    EmptyKey,

    /// The shared store could not be reached or failed the call
    #[error("shared store error: {0}")]
    Store(#[from] redis::RedisError),

    /// The shared store did not answer in time
    #[error("shared store did not answer within {0:?}")]
    StoreTimeout(Duration),

    /// The store answered with something other than the bucket reply
    #[error("unexpected token bucket reply: {0}")]
    MalformedResult(String),
}

impl LimiterError {
    pub(crate) fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub(crate) fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResult(message.into())
    }

    /// Caller-side misuse, answered with a client error
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::EmptyKey)
    }

    /// Store unreachable or timed out; subject to the fail-open policy
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::StoreTimeout(_))
    }
}
