//! Limiter integration tests
//!
//! Several limiters over one store behave like gateway instances sharing Redis.

#[cfg(test)]
mod tests {
    use crate::common::{START, clock_at_start, shared_limiters};
    use ratelimit_gateway::core::rate_limiter::{LimiterOptions, RateLimiter};
    use std::time::Duration;

    #[tokio::test]
    async fn test_instances_share_one_budget() {
        let clock = clock_at_start();
        let (first, second, _) =
            shared_limiters(LimiterOptions::new(3, Duration::from_secs(60)), &clock);

        assert!(first.allow("tenant").await.unwrap().allowed);
        assert!(second.allow("tenant").await.unwrap().allowed);
        let third = first.allow("tenant").await.unwrap();
        assert!(third.allowed);
        assert_eq!(third.remaining, 0);

        let denied = second.allow("tenant").await.unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after, Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_reset_is_time_until_full() {
        let clock = clock_at_start();
        let (limiter, _, _) =
            shared_limiters(LimiterOptions::new(10, Duration::from_secs(10)), &clock);

        for _ in 0..4 {
            limiter.allow("k").await.unwrap();
        }
        // five tokens missing at one token per second
        let decision = limiter.allow("k").await.unwrap();
        assert_eq!(decision.remaining, 5);
        assert_eq!(decision.reset.timestamp(), START + 5);
    }

    #[tokio::test]
    async fn test_denied_calls_do_not_drain_the_bucket() {
        let clock = clock_at_start();
        let (limiter, _, store) =
            shared_limiters(LimiterOptions::new(2, Duration::from_secs(2)), &clock);

        limiter.allow("k").await.unwrap();
        limiter.allow("k").await.unwrap();
        for _ in 0..5 {
            assert!(!limiter.allow("k").await.unwrap().allowed);
        }
        assert_eq!(store.tokens("k"), Some(0.0));

        clock.advance(Duration::from_secs(1));
        assert!(limiter.allow("k").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_idle_bucket_expires_and_starts_full() {
        let clock = clock_at_start();
        let (limiter, _, store) =
            shared_limiters(LimiterOptions::new(5, Duration::from_secs(30)), &clock);

        for _ in 0..5 {
            limiter.allow("k").await.unwrap();
        }
        assert_eq!(store.len(), 1);

        clock.advance(Duration::from_secs(61));
        assert!(store.is_empty());

        let decision = limiter.allow("k").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 4);
    }

    #[tokio::test]
    async fn test_burst_then_steady_rate() {
        let clock = clock_at_start();
        let options = LimiterOptions::new(50, Duration::from_secs(60)).with_burst(10);
        let (limiter, _, _) = shared_limiters(options, &clock);

        let mut admitted = 0;
        for _ in 0..100 {
            if limiter.allow("k").await.unwrap().allowed {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 60);

                clock.advance(Duration::from_secs(6));
        let mut refilled = 0;
        for _ in 0..10 {
            if limiter.allow("k").await.unwrap().allowed {
                refilled += 1;
            }
        }
        assert_eq!(refilled, 6);
    }
}
