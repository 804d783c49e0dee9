//! Rate limiter types and data structures

use super::error::LimiterError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for a single store round trip
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(500);

/// Outcome of a single `allow` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Bucket capacity at evaluation time
    pub limit: i64,
    /// Whole tokens left after this call
    pub remaining: i64,
    /// Projected time at which the bucket is full again
    pub reset: DateTime<Utc>,
    /// Time until `reset`, only set when the request was denied
    pub retry_after: Option<Duration>,
}

/// Limiter parameters
///
/// `capacity = limit + burst`, `refill_rate = capacity / window` and
/// `ttl = 2 * window` are derived once when the limiter is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterOptions {
    /// Requests per window
    pub limit: i64,
    /// Duration over which `limit` tokens accrue
    pub window: Duration,
    /// Extra capacity on top of `limit`
    pub burst: i64,
    /// Admit requests when the shared store is unreachable
    pub fail_open: bool,
    /// Upper bound for one store round trip
    pub store_timeout: Duration,
    /// Namespace prepended to bucket keys (`prefix:key`), empty for none
    pub key_prefix: String,
}

impl LimiterOptions {
    /// Options with no burst, fail-open and the default store timeout
    pub fn new(limit: i64, window: Duration) -> Self {
        Self {
            limit,
            window,
            burst: 0,
            fail_open: true,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            key_prefix: String::new(),
        }
    }

    pub fn with_burst(mut self, burst: i64) -> Self {
        self.burst = burst;
        self
    }

    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }
}

/// Rate-limit decisions for a caller key
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Evaluate and consume one token for `key`.
    ///
    /// Dropping the returned future cancels the store call.
    async fn allow(&self, key: &str) -> Result<RateLimitDecision, LimiterError>;
}

#[async_trait]
impl<L: RateLimiter + ?Sized> RateLimiter for Arc<L> {
    async fn allow(&self, key: &str) -> Result<RateLimitDecision, LimiterError> {
        (**self).allow(key).await
    }
}
