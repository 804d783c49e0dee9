//! Redis integration tests
//!
//! Run the evaluator script against a live server. Skipped unless `REDIS_ADDR`
//! is set.

#[cfg(test)]
mod tests {
    use ratelimit_gateway::config::RedisConfig;
    use ratelimit_gateway::core::rate_limiter::{LimiterOptions, RateLimiter, TokenBucketLimiter};
    use ratelimit_gateway::storage::{RedisBucketStore, RedisPool};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    async fn pool() -> RedisPool {
        let config = RedisConfig {
            addr: std::env::var("REDIS_ADDR").unwrap(),
            connect_timeout: Duration::from_secs(2),
        };
        RedisPool::new(&config).await.unwrap()
    }

    /// Prefix unique to one test run
    fn run_prefix(test: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("rl-test:{}:{}", test, nanos)
    }

    #[tokio::test]
    async fn test_health_check() {
        crate::skip_without_env!("REDIS_ADDR");
        assert!(pool().await.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_limit_sequence_against_redis() {
        crate::skip_without_env!("REDIS_ADDR");
        let store = RedisBucketStore::new(pool().await);
        let options =
            LimiterOptions::new(3, Duration::from_secs(60)).with_key_prefix(run_prefix("seq"));
        let limiter = TokenBucketLimiter::new(store, options).unwrap();

        let mut remaining = Vec::new();
        for _ in 0..3 {
            let decision = limiter.allow("client").await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.limit, 3);
            remaining.push(decision.remaining);
        }
        assert_eq!(remaining, [2, 1, 0]);

        let denied = limiter.allow("client").await.unwrap();
        assert!(!denied.allowed);
        assert!(denied.retry_after.unwrap() <= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_script_is_cached_after_first_call() {
        crate::skip_without_env!("REDIS_ADDR");
        let pool = pool().await;
        let limiter = TokenBucketLimiter::new(
            RedisBucketStore::new(pool.clone()),
            LimiterOptions::new(1, Duration::from_secs(1)).with_key_prefix(run_prefix("cache")),
        )
        .unwrap();
        limiter.allow("k").await.unwrap();

        let mut conn = pool.connection();
        let cached: Vec<i64> = redis::cmd("SCRIPT")
            .arg("EXISTS")
            .arg(limiter.store().script_hash())
            .query_async(&mut conn)
            .await
            .unwrap();
        assert_eq!(cached, [1]);
    }

    #[tokio::test]
    async fn test_instances_share_state_through_redis() {
        crate::skip_without_env!("REDIS_ADDR");
        let prefix = run_prefix("shared");
        let options = LimiterOptions::new(2, Duration::from_secs(60)).with_key_prefix(prefix);
        let first =
            TokenBucketLimiter::new(RedisBucketStore::new(pool().await), options.clone()).unwrap();
        let second = TokenBucketLimiter::new(RedisBucketStore::new(pool().await), options).unwrap();

        assert!(first.allow("k").await.unwrap().allowed);
        assert!(second.allow("k").await.unwrap().allowed);
        assert!(!first.allow("k").await.unwrap().allowed);
        assert!(!second.allow("k").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_bucket_key_gets_ttl() {
        crate::skip_without_env!("REDIS_ADDR");
        let pool = pool().await;
        let prefix = run_prefix("ttl");
        let limiter = TokenBucketLimiter::new(
            RedisBucketStore::new(pool.clone()),
            LimiterOptions::new(5, Duration::from_secs(10)).with_key_prefix(prefix.clone()),
        )
        .unwrap();
        limiter.allow("k").await.unwrap();

        let mut conn = pool.connection();
        let ttl: i64 = redis::cmd("TTL")
            .arg(format!("{}:k", prefix))
            .query_async(&mut conn)
            .await
            .unwrap();
        assert!(ttl > 0 && ttl <= 20, "unexpected ttl {}", ttl);
    }

    #[tokio::test]
    async fn test_concurrent_callers_never_exceed_capacity() {
        crate::skip_without_env!("REDIS_ADDR");
        let limiter = Arc::new(
            TokenBucketLimiter::new(
                RedisBucketStore::new(pool().await),
                LimiterOptions::new(20, Duration::from_secs(3600))
                    .with_key_prefix(run_prefix("concurrent")),
            )
            .unwrap(),
        );

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.allow("k").await.unwrap().allowed })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 20);
    }

    #[tokio::test]
    async fn test_bucket_state_keeps_microsecond_timestamps() {
        crate::skip_without_env!("REDIS_ADDR");
        let pool = pool().await;
        let prefix = run_prefix("precision");
        let limiter = TokenBucketLimiter::new(
            RedisBucketStore::new(pool.clone()),
            LimiterOptions::new(3, Duration::from_secs(7)).with_key_prefix(prefix.clone()),
        )
        .unwrap();

        let mut conn = pool.connection();
        let mut decimals = Vec::new();
        for i in 0..5 {
            limiter.allow(&format!("k{}", i)).await.unwrap();
            let ts: String = redis::cmd("HGET")
                .arg(format!("{}:k{}", prefix, i))
                .arg("ts")
                .query_async(&mut conn)
                .await
                .unwrap();
            decimals.push(ts.split('.').nth(1).map_or(0, str::len));
        }
        // a 14 digit rendering of epoch seconds keeps at most 4 decimals
        assert!(decimals.iter().any(|&d| d > 4), "decimals {:?}", decimals);
    }
}
