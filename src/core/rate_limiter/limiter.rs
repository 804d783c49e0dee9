//! Core rate limiter implementation

use super::clock::{Clock, SystemClock};
use super::error::LimiterError;
use super::reply::parse_bucket_reply;
use super::types::{LimiterOptions, RateLimitDecision, RateLimiter};
use crate::storage::{BucketArgs, BucketStore};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Distributed token bucket limiter
///
/// Each call runs one atomic evaluation against the shared store. The limiter
/// itself holds no per-key state and is safe to share across tasks.
pub struct TokenBucketLimiter<S: BucketStore + ?Sized> {
    store: Arc<S>,
    capacity: i64,
    refill_rate: f64,
    window: Duration,
    ttl_seconds: i64,
    fail_open: bool,
    store_timeout: Duration,
    key_prefix: String,
    clock: Arc<dyn Clock>,
}

impl<S: BucketStore + ?Sized> std::fmt::Debug for TokenBucketLimiter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucketLimiter")
            .field("capacity", &self.capacity)
            .field("refill_rate", &self.refill_rate)
            .field("window", &self.window)
            .field("fail_open", &self.fail_open)
            .finish_non_exhaustive()
    }
}

impl<S: BucketStore> TokenBucketLimiter<S> {
    /// Create a new limiter over `store`
    pub fn new(store: S, options: LimiterOptions) -> Result<Self, LimiterError> {
        Self::from_shared(Arc::new(store), options)
    }
}

impl<S: BucketStore + ?Sized> TokenBucketLimiter<S> {
    /// Create a limiter over an already shared store
    pub fn from_shared(store: Arc<S>, options: LimiterOptions) -> Result<Self, LimiterError> {
        Self::with_clock(store, options, Arc::new(SystemClock))
    }

    /// Create a limiter computing fallback resets and retry delays from `clock`
    pub fn with_clock(
        store: Arc<S>,
        options: LimiterOptions,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LimiterError> {
        if options.limit <= 0 {
            return Err(LimiterError::invalid_config("limit must be positive"));
        }
        if options.window.is_zero() {
            return Err(LimiterError::invalid_config("window must be positive"));
        }
        if options.burst < 0 {
            return Err(LimiterError::invalid_config("burst must be >= 0"));
        }
        if options.store_timeout.is_zero() {
            return Err(LimiterError::invalid_config("store timeout must be positive"));
        }
        let capacity = options
            .limit
            .checked_add(options.burst)
            .ok_or_else(|| LimiterError::invalid_config("limit + burst overflows"))?;

        let window_secs = options.window.as_secs_f64();
        let refill_rate = capacity as f64 / window_secs;
        if !refill_rate.is_finite() {
            return Err(LimiterError::invalid_config("window is too short"));
        }
        let ttl_seconds = ((2.0 * window_secs).ceil() as i64).max(1);

        Ok(Self {
            store,
            capacity,
            refill_rate,
            window: options.window,
            ttl_seconds,
            fail_open: options.fail_open,
            store_timeout: options.store_timeout,
            key_prefix: options.key_prefix,
            clock,
        })
    }

    /// `limit + burst`
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Tokens regenerated per second
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Idle expiry applied to bucket keys
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn fail_open(&self) -> bool {
        self.fail_open
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn bucket_key<'a>(&self, key: &'a str) -> std::borrow::Cow<'a, str> {
        if self.key_prefix.is_empty() {
            std::borrow::Cow::Borrowed(key)
        } else {
            std::borrow::Cow::Owned(format!("{}:{}", self.key_prefix, key))
        }
    }

    fn args(&self) -> BucketArgs {
        BucketArgs {
            capacity: self.capacity,
            refill_rate: self.refill_rate,
            ttl_seconds: self.ttl_seconds,
        }
    }

    /// Apply the degradation policy to a store failure
    fn degrade(&self, key: &str, error: LimiterError) -> Result<RateLimitDecision, LimiterError> {
        if !self.fail_open {
            warn!(key, error = %error, "shared store unavailable, failing closed");
            return Err(error);
        }

        warn!(key, error = %error, "shared store unavailable, failing open");
        let now = self.clock.now();
        let reset = TimeDelta::from_std(self.window)
            .ok()
            .and_then(|window| now.checked_add_signed(window))
            .unwrap_or(now);

        Ok(RateLimitDecision {
            allowed: true,
            limit: self.capacity,
            remaining: self.capacity,
            reset,
            retry_after: None,
        })
    }
}

#[async_trait]
impl<S: BucketStore + ?Sized> RateLimiter for TokenBucketLimiter<S> {
    async fn allow(&self, key: &str) -> Result<RateLimitDecision, LimiterError> {
        if key.is_empty() {
            return Err(LimiterError::EmptyKey);
        }

        let bucket_key = self.bucket_key(key);
        let args = self.args();
        let evaluated = tokio::time::timeout(
            self.store_timeout,
            self.store.eval_token_bucket(&bucket_key, &args),
        )
        .await;

        let value = match evaluated {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => return self.degrade(key, LimiterError::Store(e)),
            Err(_) => return self.degrade(key, LimiterError::StoreTimeout(self.store_timeout)),
        };

        let reply = parse_bucket_reply(&value)?;
        let reset = epoch_to_datetime(reply.reset_epoch)?;
        let retry_after = if reply.allowed {
            None
        } else {
            Some((reset - self.clock.now()).to_std().unwrap_or(Duration::ZERO))
        };

        debug!(
            key,
            allowed = reply.allowed,
            remaining = reply.remaining,
            limit = reply.capacity,
            "rate limit decision"
        );

        Ok(RateLimitDecision {
            allowed: reply.allowed,
            limit: reply.capacity,
            remaining: reply.remaining,
            reset,
            retry_after,
        })
    }
}

fn epoch_to_datetime(secs: i64) -> Result<DateTime<Utc>, LimiterError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| LimiterError::malformed(format!("reset {} is out of range", secs)))
}
