//! Admission gate
//!
//! One request passes through `resolve key -> allow -> annotate -> continue or
//! reject`. The inline middleware and the reverse proxy share this sequence and
//! differ only in their [`Continuation`].

use crate::core::identity::{HeaderKeyResolver, KeyResolver};
use crate::core::rate_limiter::{RateLimitDecision, RateLimiter};
use crate::utils::error::{
    INVALID_KEY, LIMITER_UNAVAILABLE, RATE_LIMIT_EXCEEDED, error_response,
};
use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use actix_web::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Telemetry headers derived from one decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: i64,
    pub remaining: i64,
    /// Epoch seconds at which the bucket is full again
    pub reset: i64,
    /// `Retry-After` seconds, only for denied requests
    pub retry_after: Option<u64>,
}

impl RateLimitHeaders {
    pub fn from_decision(decision: &RateLimitDecision) -> Self {
        let retry_after = if decision.allowed {
            None
        } else {
            Some(retry_after_secs(decision.retry_after.unwrap_or_default()))
        };

        Self {
            limit: decision.limit,
            remaining: decision.remaining,
            reset: decision.reset.timestamp(),
            retry_after,
        }
    }

    /// Write the headers, replacing existing values
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            HeaderName::from_static(X_RATELIMIT_LIMIT),
            HeaderValue::from(self.limit),
        );
        headers.insert(
            HeaderName::from_static(X_RATELIMIT_REMAINING),
            HeaderValue::from(self.remaining),
        );
        headers.insert(
            HeaderName::from_static(X_RATELIMIT_RESET),
            HeaderValue::from(self.reset),
        );
        if let Some(retry_after) = self.retry_after {
            headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
        }
    }
}

/// Whole seconds to wait, never below one
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

/// Why a request was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No usable caller key
    InvalidKey,
    /// Limiter could not decide
    Unavailable,
    /// Bucket is empty
    Limited(RateLimitHeaders),
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::InvalidKey => StatusCode::BAD_REQUEST,
            Rejection::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Rejection::Limited(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        match self {
            Rejection::InvalidKey => error_response(self.status(), INVALID_KEY),
            Rejection::Unavailable => error_response(self.status(), LIMITER_UNAVAILABLE),
            Rejection::Limited(headers) => {
                let mut response = error_response(self.status(), RATE_LIMIT_EXCEEDED);
                headers.apply(response.headers_mut());
                response
            }
        }
    }
}

/// Outcome of [`AdmissionGate::evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted(RateLimitHeaders),
    Rejected(Rejection),
}

/// What happens after the gate has decided
#[async_trait(?Send)]
pub trait Continuation {
    type Output;

    /// Request the decision is made for
    fn request(&self) -> &HttpRequest;

    /// Run the next stage: the wrapped handler or the upstream
    async fn proceed(self) -> Self::Output;

    /// Answer without running the next stage
    fn reject(self, response: HttpResponse) -> Self::Output;

    /// Attach rate limit headers to the next stage's output
    fn annotate(output: &mut Self::Output, headers: &RateLimitHeaders);
}

/// Identity resolution plus limiter, shared by every surface
#[derive(Clone)]
pub struct AdmissionGate {
    limiter: Arc<dyn RateLimiter>,
    resolver: Arc<dyn KeyResolver>,
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate").finish_non_exhaustive()
    }
}

impl AdmissionGate {
    /// Gate resolving keys with the default [`HeaderKeyResolver`]
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self::with_resolver(limiter, Arc::new(HeaderKeyResolver::default()))
    }

    pub fn with_resolver(limiter: Arc<dyn RateLimiter>, resolver: Arc<dyn KeyResolver>) -> Self {
        Self { limiter, resolver }
    }

    /// Decide on `req` without running anything after the gate
    pub async fn evaluate(&self, req: &HttpRequest) -> Admission {
        let key = match self.resolver.resolve(req) {
            Ok(key) => key,
            Err(e) => {
                debug!(error = %e, path = req.path(), "no rate limit key");
                return Admission::Rejected(Rejection::InvalidKey);
            }
        };

        let decision = match self.limiter.allow(&key).await {
            Ok(decision) => decision,
            Err(e) if e.is_usage_error() => {
                return Admission::Rejected(Rejection::InvalidKey);
            }
            Err(e) => {
                error!(error = %e, "rate limiter error");
                return Admission::Rejected(Rejection::Unavailable);
            }
        };

        let headers = RateLimitHeaders::from_decision(&decision);
        if decision.allowed {
            Admission::Admitted(headers)
        } else {
            debug!(key = %key, retry_after = ?headers.retry_after, "rate limit exceeded");
            Admission::Rejected(Rejection::Limited(headers))
        }
    }

    /// Evaluate the request carried by `next`, then either continue or reject
    ///
    /// No handle to the request outlives the decision: routing below the gate
    /// needs exclusive access to it.
    pub async fn admit<C: Continuation>(&self, next: C) -> C::Output {
        let admission = self.evaluate(next.request()).await;
        match admission {
            Admission::Admitted(headers) => {
                let mut output = next.proceed().await;
                C::annotate(&mut output, &headers);
                output
            }
            Admission::Rejected(rejection) => next.reject(rejection.into_response()),
        }
    }
}
