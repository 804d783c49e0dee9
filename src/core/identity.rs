//! Caller identity resolution
//!
//! The rate limit key is taken from, in order:
//!
//! 1. the configured key header (default `X-API-Key`)
//! 2. `Authorization` (the token of a `Bearer` credential, otherwise the whole value)
//! 3. the first entry of `X-Forwarded-For`
//! 4. the peer IP of the connection
//!
//! `X-Forwarded-For` is client-controlled; it only identifies callers reliably
//! behind a proxy chain that overwrites it.

use actix_web::HttpRequest;
use actix_web::http::header::{AUTHORIZATION, HeaderMap, HeaderName};
use std::net::SocketAddr;
use thiserror::Error;

/// Header consulted first when none is configured
pub const DEFAULT_KEY_HEADER: &str = "X-API-Key";

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No identity source yielded a value
    #[error("missing rate limit key")]
    MissingKey,

    /// Configured key header is not a valid header name
    #[error("invalid key header name: {0}")]
    InvalidHeader(String),
}

/// Maps a request to its rate limit key
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, req: &HttpRequest) -> Result<String, IdentityError>;
}

impl<F> KeyResolver for F
where
    F: Fn(&HttpRequest) -> Result<String, IdentityError> + Send + Sync,
{
    fn resolve(&self, req: &HttpRequest) -> Result<String, IdentityError> {
        self(req)
    }
}

/// Default header / bearer / forwarded-for / peer resolver
#[derive(Debug, Clone)]
pub struct HeaderKeyResolver {
    key_header: HeaderName,
}

impl Default for HeaderKeyResolver {
    fn default() -> Self {
        Self {
            key_header: HeaderName::from_static("x-api-key"),
        }
    }
}

impl HeaderKeyResolver {
    /// Resolver reading `key_header` first; an empty name selects [`DEFAULT_KEY_HEADER`]
    pub fn new(key_header: &str) -> Result<Self, IdentityError> {
        let key_header = key_header.trim();
        if key_header.is_empty() {
            return Ok(Self::default());
        }

        let key_header = HeaderName::try_from(key_header)
            .map_err(|_| IdentityError::InvalidHeader(key_header.to_string()))?;
        Ok(Self { key_header })
    }

    pub fn key_header(&self) -> &HeaderName {
        &self.key_header
    }

    /// Resolve from raw request parts
    pub fn resolve_parts(
        &self,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
    ) -> Result<String, IdentityError> {
        if let Some(key) = header_value(headers, &self.key_header) {
            return Ok(key.to_string());
        }

        if let Some(auth) = header_value(headers, &AUTHORIZATION) {
            let parts: Vec<&str> = auth.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                return Ok(parts[1].to_string());
            }
            return Ok(auth.to_string());
        }

        let forwarded = HeaderName::from_static(X_FORWARDED_FOR);
        if let Some(first) = header_value(headers, &forwarded)
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty())
        {
            return Ok(first.to_string());
        }

        peer.map(|addr| addr.ip().to_string())
            .ok_or(IdentityError::MissingKey)
    }
}

impl KeyResolver for HeaderKeyResolver {
    fn resolve(&self, req: &HttpRequest) -> Result<String, IdentityError> {
        self.resolve_parts(req.headers(), req.peer_addr())
    }
}

/// Trimmed, non-empty, visible-ASCII header value
fn header_value<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn peer() -> SocketAddr {
        "10.0.0.9:51234".parse().unwrap()
    }

    fn resolve(req: TestRequest) -> Result<String, IdentityError> {
        HeaderKeyResolver::default().resolve(&req.to_http_request())
    }

    #[test]
    fn test_key_header_wins_over_authorization() {
        let req = TestRequest::default()
            .insert_header(("X-API-Key", "abc"))
            .insert_header(("Authorization", "Bearer xyz"));
        assert_eq!(resolve(req).unwrap(), "abc");
    }

    #[test]
    fn test_bearer_token() {
        let req = TestRequest::default().insert_header(("Authorization", "Bearer xyz"));
        assert_eq!(resolve(req).unwrap(), "xyz");

        let req = TestRequest::default().insert_header(("Authorization", "bearer   xyz "));
        assert_eq!(resolve(req).unwrap(), "xyz");
    }

    #[test]
    fn test_other_authorization_used_verbatim() {
        let req = TestRequest::default().insert_header(("Authorization", "Basic dXNlcjpwYXNz"));
        assert_eq!(resolve(req).unwrap(), "Basic dXNlcjpwYXNz");

        let req = TestRequest::default().insert_header(("Authorization", "Bearer a b"));
        assert_eq!(resolve(req).unwrap(), "Bearer a b");
    }

    #[test]
    fn test_first_forwarded_for_entry() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "1.2.3.4, 5.6.6.7"))
            .peer_addr(peer());
        assert_eq!(resolve(req).unwrap(), "1.2.3.4");
    }

    #[test]
    fn test_empty_forwarded_for_entry_falls_through() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", " , 5.6.6.7"))
            .peer_addr(peer());
        assert_eq!(resolve(req).unwrap(), "10.0.0.9");
    }

    #[test]
    fn test_peer_address_without_port() {
        let req = TestRequest::default().peer_addr(peer());
        assert_eq!(resolve(req).unwrap(), "10.0.0.9");
    }

    #[test]
    fn test_blank_headers_are_ignored() {
        let req = TestRequest::default()
            .insert_header(("X-API-Key", "   "))
            .insert_header(("Authorization", ""))
            .peer_addr(peer());
        assert_eq!(resolve(req).unwrap(), "10.0.0.9");
    }

    #[test]
    fn test_no_source_is_missing_key() {
        let resolver = HeaderKeyResolver::default();
        let err = resolver.resolve_parts(&HeaderMap::new(), None).unwrap_err();
        assert_eq!(err, IdentityError::MissingKey);
    }

    #[test]
    fn test_custom_key_header() {
        let resolver = HeaderKeyResolver::new("X-Tenant").unwrap();
        let req = TestRequest::default()
            .insert_header(("X-API-Key", "abc"))
            .insert_header(("X-Tenant", "acme"))
            .to_http_request();
        assert_eq!(resolver.resolve(&req).unwrap(), "acme");
    }

    #[test]
    fn test_empty_header_name_uses_default() {
        let resolver = HeaderKeyResolver::new("").unwrap();
        assert_eq!(resolver.key_header().as_str(), "x-api-key");
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        let err = HeaderKeyResolver::new("bad header").unwrap_err();
        assert!(matches!(err, IdentityError::InvalidHeader(_)));
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |req: &HttpRequest| -> Result<String, IdentityError> {
            Ok(req.path().to_string())
        };
        let req = TestRequest::with_uri("/tenant/7").to_http_request();
        assert_eq!(resolver.resolve(&req).unwrap(), "/tenant/7");
    }
}
