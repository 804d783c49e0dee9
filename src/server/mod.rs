//! HTTP server implementation
//!
//! This module provides the admission gate, both integration surfaces and the
//! server that hosts them.

pub mod gate;
pub mod middleware;
pub mod proxy;
pub mod routes;

pub mod builder;
pub mod server;
pub mod state;


pub use builder::{ServerBuilder, build_gate, build_limiter, run_server};
pub use gate::{Admission, AdmissionGate, Continuation, RateLimitHeaders, Rejection};
pub use middleware::RateLimitMiddleware;
pub use proxy::UpstreamProxy;
pub use server::HttpServer;
pub use state::AppState;
