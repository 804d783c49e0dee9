//! HTTP response handling for errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Client-facing messages
pub(crate) const INVALID_KEY: &str = "invalid rate limit key";
pub(crate) const LIMITER_UNAVAILABLE: &str = "rate limiter unavailable";
pub(crate) const UPSTREAM_UNAVAILABLE: &str = "upstream unavailable";
pub(crate) const RATE_LIMIT_EXCEEDED: &str = "rate limit exceeded";
const INTERNAL: &str = "internal error";

/// Standard error response format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    /// RFC 3339, UTC, second precision
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            error: message.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Build a JSON error response
pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody::new(message))
}

impl GatewayError {
    fn client_message(&self) -> String {
        match self {
            GatewayError::BadRequest(message) => message.clone(),
            GatewayError::Identity(_) => INVALID_KEY.to_string(),
            GatewayError::Limiter(e) if e.is_usage_error() => INVALID_KEY.to_string(),
            GatewayError::Limiter(_) | GatewayError::Redis(_) | GatewayError::Unavailable(_) => {
                LIMITER_UNAVAILABLE.to_string()
            }
            GatewayError::Upstream(_) => UPSTREAM_UNAVAILABLE.to_string(),
            _ => INTERNAL.to_string(),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) | GatewayError::Identity(_) => StatusCode::BAD_REQUEST,
            GatewayError::Limiter(e) if e.is_usage_error() => StatusCode::BAD_REQUEST,
            GatewayError::Limiter(_) | GatewayError::Redis(_) | GatewayError::Unavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), &self.client_message())
    }
}
