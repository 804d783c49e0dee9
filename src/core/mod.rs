//! Core admission logic
//!
//! This module contains the distributed token bucket limiter and the identity
//! resolution that feeds it.

pub mod identity;
pub mod rate_limiter;
