//! Demo application routes

use actix_web::{HttpResponse, web};
use serde_json::json;

/// Configure demo routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/hello", web::get().to(hello));
}

/// `GET /hello`
pub async fn hello() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "hello" }))
}
