//! Token bucket evaluator
//!
//! The whole read-modify-write of a bucket runs inside one Lua script, so Redis
//! serializes concurrent calls on the same key. Time is taken from Redis `TIME`,
//! never from the callers.

use super::pool::RedisPool;
use crate::storage::{BucketArgs, BucketStore};
use async_trait::async_trait;
use redis::{RedisResult, Script, Value};
use std::sync::Arc;
use tracing::trace;

/// Lua source of the token bucket evaluator
///
/// `KEYS[1]` is the bucket key, `ARGV` is `capacity, refill_rate, ttl_seconds`.
/// Returns `{allowed, remaining, ceil(reset_epoch), capacity}`.
pub const TOKEN_BUCKET_LUA: &str = r#"
local key = KEYS[1]
local capacity = tonumber(ARGV[1])
local rate = tonumber(ARGV[2])
local ttl = tonumber(ARGV[3])

local now_data = redis.call("TIME")
local now = tonumber(now_data[1]) + (tonumber(now_data[2]) / 1000000)

local data = redis.call("HMGET", key, "tokens", "ts")
local tokens = tonumber(data[1])
local ts = tonumber(data[2])

if tokens == nil or ts == nil then
  tokens = capacity
else
  local delta = math.max(0, now - ts)
  tokens = math.min(capacity, tokens + (delta * rate))
end

local allowed = 0
if tokens >= 1 then
  allowed = 1
  tokens = tokens - 1
end

local remaining = math.floor(tokens)
local reset = now
if rate > 0 then
  reset = now + (capacity - tokens) / rate
end

redis.call("HSET", key, "tokens", string.format("%.17g", tokens), "ts", string.format("%.17g", now))
redis.call("EXPIRE", key, ttl)

return { allowed, remaining, math.ceil(reset), capacity }
"#;

/// [`BucketStore`] backed by Redis
///
/// Uses `EVALSHA` and falls back to `SCRIPT LOAD` + retry when the script cache
/// was flushed.
#[derive(Clone)]
pub struct RedisBucketStore {
    pool: RedisPool,
    script: Arc<Script>,
}

impl std::fmt::Debug for RedisBucketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBucketStore")
            .field("pool", &self.pool)
            .field("script_sha", &self.script.get_hash())
            .finish()
    }
}

impl RedisBucketStore {
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            script: Arc::new(Script::new(TOKEN_BUCKET_LUA)),
        }
    }

    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    /// SHA1 the script is invoked by
    pub fn script_hash(&self) -> &str {
        self.script.get_hash()
    }
}

#[async_trait]
impl BucketStore for RedisBucketStore {
    async fn eval_token_bucket(&self, key: &str, args: &BucketArgs) -> RedisResult<Value> {
        trace!(key, capacity = args.capacity, "evaluating token bucket");

        let mut conn = self.pool.connection();
        self.script
            .key(key)
            .arg(args.capacity)
            .arg(args.refill_rate)
            .arg(args.ttl_seconds)
            .invoke_async(&mut conn)
            .await
    }
}
