//! Liveness endpoints
//!
//! Registered outside the admission gate so probes are never rate limited.

use actix_web::HttpResponse;
use serde_json::json;
use tracing::trace;

/// `GET /healthz` on the demo API
pub async fn api_health() -> HttpResponse {
    trace!("Health check requested");
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// `/healthz` on the proxy, any method
pub async fn proxy_health() -> HttpResponse {
    trace!("Health check requested");
    HttpResponse::Ok().content_type("text/plain; charset=utf-8").body("ok")
}
