//! Configuration data models
//!
//! This module defines all configuration structures used by both binaries.

pub mod logging;
pub mod proxy;
pub mod rate_limit;
pub mod server;
pub mod storage;

// Re-export all configuration types
pub use logging::*;
pub use proxy::*;
pub use rate_limit::*;
pub use server::*;
pub use storage::*;

use std::time::Duration;

/// Default requests per window
pub fn default_limit() -> i64 {
    100
}

/// Default refill window
pub fn default_window() -> Duration {
    Duration::from_secs(60)
}

/// Default key header
pub fn default_key_header() -> String {
    crate::core::identity::DEFAULT_KEY_HEADER.to_string()
}

/// Default bound for one store round trip
pub fn default_store_timeout() -> Duration {
    crate::core::rate_limiter::DEFAULT_STORE_TIMEOUT
}

/// Default Redis address
pub fn default_redis_addr() -> String {
    "localhost:6379".to_string()
}

/// Default Redis connect timeout
pub fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Default upstream for the proxy
pub fn default_upstream() -> String {
    "http://localhost:8081".to_string()
}

/// Default timeout for requests forwarded upstream
pub fn default_upstream_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Default time allowed for a client to send its request head
pub fn default_read_header_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Default log level
pub fn default_log_level() -> String {
    "info".to_string()
}
