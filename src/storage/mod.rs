//! Shared bucket state storage
//!
//! A [`BucketStore`] runs the token bucket evaluator atomically against one key
//! and answers with the raw four-element reply. Redis is the production backend;
//! the in-memory store runs the same algorithm for tests and local development.

/// In-process bucket stores
pub mod memory;
/// Redis bucket store
pub mod redis;

pub use self::memory::{MemoryBucketStore, UnavailableStore};
pub use self::redis::{RedisBucketStore, RedisPool, TOKEN_BUCKET_LUA};

use async_trait::async_trait;
use std::sync::Arc;

/// Arguments passed to the evaluator alongside the key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketArgs {
    /// Maximum tokens (`limit + burst`)
    pub capacity: i64,
    /// Tokens regenerated per second
    pub refill_rate: f64,
    /// Idle expiry of the bucket key
    pub ttl_seconds: i64,
}

/// Atomic, server-side evaluation of the token bucket for a single key
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Run one read-modify-write of the bucket stored under `key`.
    ///
    /// Returns `{allowed, remaining, reset_epoch, capacity}` as the store encodes it.
    async fn eval_token_bucket(
        &self,
        key: &str,
        args: &BucketArgs,
    ) -> ::redis::RedisResult<::redis::Value>;
}

#[async_trait]
impl<S: BucketStore + ?Sized> BucketStore for Arc<S> {
    async fn eval_token_bucket(
        &self,
        key: &str,
        args: &BucketArgs,
    ) -> ::redis::RedisResult<::redis::Value> {
        (**self).eval_token_bucket(key, args).await
    }
}
