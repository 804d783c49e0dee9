//! Distributed token bucket rate limiting
//!
//! The bucket state lives in the shared store and is only ever touched by the
//! atomic evaluator script. This module owns the client side: configuration
//! validation, reply parsing and the fail-open / fail-closed degradation policy.

mod clock;
mod error;
mod limiter;
mod reply;
mod types;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::LimiterError;
pub use limiter::TokenBucketLimiter;
pub use reply::{BucketReply, parse_bucket_reply};
pub use types::{DEFAULT_STORE_TIMEOUT, LimiterOptions, RateLimitDecision, RateLimiter};
