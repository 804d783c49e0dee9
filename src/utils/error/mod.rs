//! Error handling for the gateway
//!
//! This module defines the error types used throughout the gateway and how they
//! are rendered to clients.

mod helpers;
mod response;
mod types;

// Re-export all public types
pub use response::{ErrorBody, error_response};
pub(crate) use response::{
    INVALID_KEY, LIMITER_UNAVAILABLE, RATE_LIMIT_EXCEEDED, UPSTREAM_UNAVAILABLE,
};
pub use types::{GatewayError, Result};
