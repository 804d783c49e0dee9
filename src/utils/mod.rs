//! Utility modules
//!
//! - **error**: Error types and their client-facing rendering
//! - **logging**: Tracing subscriber setup

pub mod error;
pub mod logging;
