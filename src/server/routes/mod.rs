//! HTTP route modules

pub mod demo;
pub mod health;

use crate::config::ServeMode;
use crate::server::gate::AdmissionGate;
use crate::server::middleware::RateLimitMiddleware;
use crate::server::proxy::{UpstreamProxy, proxy_request};
use crate::server::state::AppState;
use actix_web::web;

/// Routes of the demo API: health outside the gate, everything else behind it
pub fn configure_api(cfg: &mut web::ServiceConfig, gate: AdmissionGate) {
    cfg.route("/healthz", web::get().to(health::api_health)).service(
        web::scope("")
            .wrap(RateLimitMiddleware::new(gate))
            .configure(demo::configure_routes),
    );
}

/// Routes of the proxy: health locally, everything else gated and forwarded
pub fn configure_proxy(
    cfg: &mut web::ServiceConfig,
    gate: AdmissionGate,
    upstream: web::Data<UpstreamProxy>,
) {
    cfg.app_data(web::Data::new(gate))
        .app_data(upstream)
        .route("/healthz", web::route().to(health::proxy_health))
        .default_service(web::to(proxy_request));
}

/// Routes for the surface selected by `state`
pub fn configure_app(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.clone()));
    match (state.mode, &state.upstream) {
        (ServeMode::Proxy, Some(upstream)) => {
            configure_proxy(cfg, state.gate.clone(), upstream.clone())
        }
        _ => configure_api(cfg, state.gate.clone()),
    }
}
