//! Helper functions for creating specific error types

use super::types::GatewayError;

impl GatewayError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable(message.into())
    }

    /// Whether the error was caused by the client request
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::BadRequest(_) | Self::Identity(_) => true,
            Self::Limiter(e) => e.is_usage_error(),
            _ => false,
        }
    }
}
