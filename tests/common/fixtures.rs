//! Limiter and request fixtures

use actix_web::test::TestRequest;
use chrono::DateTime;
use ratelimit_gateway::core::rate_limiter::{LimiterOptions, ManualClock, TokenBucketLimiter};
use ratelimit_gateway::server::AdmissionGate;
use ratelimit_gateway::storage::MemoryBucketStore;
use std::sync::Arc;
use std::time::Duration;

/// Fixed epoch all clock-driven tests start from
pub const START: i64 = 1_700_000_000;

pub fn clock_at_start() -> ManualClock {
    ManualClock::new(DateTime::from_timestamp(START, 0).unwrap())
}

/// Two limiters over one store, standing in for two gateway instances
pub fn shared_limiters(
    options: LimiterOptions,
    clock: &ManualClock,
) -> (
    TokenBucketLimiter<MemoryBucketStore>,
    TokenBucketLimiter<MemoryBucketStore>,
    Arc<MemoryBucketStore>,
) {
    let store = Arc::new(MemoryBucketStore::with_clock(Arc::new(clock.clone())));
    let first =
        TokenBucketLimiter::with_clock(store.clone(), options.clone(), Arc::new(clock.clone()))
            .unwrap();
    let second =
        TokenBucketLimiter::with_clock(store.clone(), options, Arc::new(clock.clone())).unwrap();
    (first, second, store)
}

/// Gate over a fresh in-memory store
pub fn memory_gate(limit: i64, window: Duration) -> AdmissionGate {
    let limiter =
        TokenBucketLimiter::new(MemoryBucketStore::new(), LimiterOptions::new(limit, window))
            .unwrap();
    AdmissionGate::new(Arc::new(limiter))
}

/// Request identified by `X-API-Key`
pub fn keyed_request(uri: &str, key: &str) -> TestRequest {
    TestRequest::get().uri(uri).insert_header(("X-API-Key", key))
}
