//! In-process bucket stores
//!
//! [`MemoryBucketStore`] executes the same algorithm as the Redis script under a
//! single lock, so every call is atomic within one process. Limits are not shared
//! across instances.

use super::{BucketArgs, BucketStore};
use crate::core::rate_limiter::{Clock, SystemClock};
use async_trait::async_trait;
use parking_lot::Mutex;
use redis::{ErrorKind, RedisError, RedisResult, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Persisted bucket state
#[derive(Debug, Clone, Copy, PartialEq)]
struct BucketState {
    tokens: f64,
    timestamp: f64,
    expires_at: f64,
}

/// Fresh buckets created between two sweeps of expired ones
const SWEEP_INTERVAL: usize = 1024;

#[derive(Debug, Default)]
struct Buckets {
    entries: HashMap<String, BucketState>,
    created_since_sweep: usize,
}

/// Token bucket store held in process memory
///
/// Expired buckets are invisible immediately and reclaimed every
/// `SWEEP_INTERVAL` bucket creations, or on [`MemoryBucketStore::purge_expired`].
#[derive(Debug, Clone)]
pub struct MemoryBucketStore {
    buckets: Arc<Mutex<Buckets>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryBucketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Store reading "server" time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(Buckets::default())),
            clock,
        }
    }

    /// Number of live (unexpired) buckets
    pub fn len(&self) -> usize {
        let now = self.clock.now_epoch_secs();
        self.buckets
            .lock()
            .entries
            .values()
            .filter(|state| state.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current token count for `key`, without refilling or consuming
    pub fn tokens(&self, key: &str) -> Option<f64> {
        let now = self.clock.now_epoch_secs();
        self.buckets
            .lock()
            .entries
            .get(key)
            .filter(|state| state.expires_at > now)
            .map(|state| state.tokens)
    }

    /// Drop expired buckets
    pub fn purge_expired(&self) {
        let now = self.clock.now_epoch_secs();
        let mut buckets = self.buckets.lock();
        buckets.entries.retain(|_, state| state.expires_at > now);
        buckets.created_since_sweep = 0;
    }

    fn evaluate(&self, key: &str, args: &BucketArgs) -> [i64; 4] {
        let capacity = args.capacity as f64;
        let rate = args.refill_rate;

        let mut buckets = self.buckets.lock();
        let now = self.clock.now_epoch_secs();

        let current = buckets.entries.get(key).filter(|state| state.expires_at > now);
        let fresh = current.is_none();
        let mut tokens = match current {
            None => capacity,
            Some(state) => {
                let elapsed = (now - state.timestamp).max(0.0);
                (state.tokens + elapsed * rate).min(capacity)
            }
        };

        let allowed = if tokens >= 1.0 {
            tokens -= 1.0;
            1
        } else {
            0
        };

        let remaining = tokens.floor() as i64;
        let reset = if rate > 0.0 {
            now + (capacity - tokens) / rate
        } else {
            now
        };

        if fresh {
            buckets.created_since_sweep += 1;
            if buckets.created_since_sweep >= SWEEP_INTERVAL {
                buckets.entries.retain(|_, state| state.expires_at > now);
                buckets.created_since_sweep = 0;
            }
        }
        buckets.entries.insert(
            key.to_string(),
            BucketState {
                tokens,
                timestamp: now,
                expires_at: now + args.ttl_seconds as f64,
            },
        );

        [allowed, remaining, reset.ceil() as i64, args.capacity]
    }
}

#[async_trait]
impl BucketStore for MemoryBucketStore {
    async fn eval_token_bucket(&self, key: &str, args: &BucketArgs) -> RedisResult<Value> {
        let reply = self.evaluate(key, args);
        Ok(Value::Array(reply.iter().map(|v| Value::Int(*v)).collect()))
    }
}

/// Store that is never reachable
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

#[async_trait]
impl BucketStore for UnavailableStore {
    async fn eval_token_bucket(&self, _key: &str, _args: &BucketArgs) -> RedisResult<Value> {
        Err(RedisError::from((
            ErrorKind::IoError,
            "shared store unreachable",
        )))
    }
}
