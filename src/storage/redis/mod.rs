//! Redis storage implementation
//!
//! ## Module Structure
//!
//! - `pool` - Client, auto-reconnecting connection and health checks
//! - `script` - Token bucket evaluator script and the [`BucketStore`](super::BucketStore) backed by it
//! - `tests` - Module tests

mod pool;
mod script;

// Re-export public types
pub use pool::RedisPool;
pub use script::{RedisBucketStore, TOKEN_BUCKET_LUA};
