//! Integration tests for ratelimit-gateway
//!
//! These tests drive the public API the way the binaries do.

pub mod config_tests;
pub mod gate_tests;
pub mod limiter_tests;
pub mod redis_tests;
