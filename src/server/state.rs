//! Application state shared across HTTP handlers

use crate::config::{Config, ServeMode};
use crate::server::gate::AdmissionGate;
use crate::server::proxy::UpstreamProxy;
use actix_web::web;
use std::sync::Arc;

/// HTTP server state shared across workers
///
/// Built once at startup and read-only afterwards.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Gateway configuration
    pub config: Arc<Config>,
    /// Surface being served
    pub mode: ServeMode,
    /// Admission gate shared by all workers
    pub gate: AdmissionGate,
    /// Upstream client, proxy mode only
    pub upstream: Option<web::Data<UpstreamProxy>>,
}

impl AppState {
    /// State for the demo API
    pub fn api(config: Config, gate: AdmissionGate) -> Self {
        Self {
            config: Arc::new(config),
            mode: ServeMode::Api,
            gate,
            upstream: None,
        }
    }

    /// State for the reverse proxy
    pub fn proxy(config: Config, gate: AdmissionGate, upstream: UpstreamProxy) -> Self {
        Self {
            config: Arc::new(config),
            mode: ServeMode::Proxy,
            gate,
            upstream: Some(web::Data::new(upstream)),
        }
    }
}
