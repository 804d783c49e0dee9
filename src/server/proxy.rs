//! Reverse proxy surface
//!
//! Admitted requests are forwarded to a single upstream with method, path,
//! query, end-to-end headers and body unchanged. The upstream response is
//! streamed back with the rate limit headers added.
//!
//! Hop-by-hop headers are dropped, including any named by the request's own
//! `Connection` header. `Host` is not forwarded: the client derives it from
//! the upstream URL so name-based virtual hosting upstream keeps working. The
//! caller's `Host` travels as `X-Forwarded-Host` unless that is already set.

use crate::config::ProxyConfig;
use crate::server::gate::{AdmissionGate, Continuation, RateLimitHeaders};
use crate::utils::error::{GatewayError, Result};
use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName as ActixHeaderName, HeaderValue as ActixHeaderValue};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error};
use url::Url;

/// Headers that describe a single connection and are never forwarded
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|hop| name.eq_ignore_ascii_case(hop))
}

/// Header names listed in `Connection`, lowercased
fn connection_tokens(req: &HttpRequest) -> Vec<String> {
    req.headers()
        .get_all("connection")
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// HTTP client bound to one upstream
#[derive(Debug, Clone)]
pub struct UpstreamProxy {
    client: reqwest::Client,
    upstream: Url,
}

impl UpstreamProxy {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let upstream = Url::parse(&config.upstream)
            .map_err(|e| GatewayError::config(format!("invalid upstream url: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| GatewayError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, upstream })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// Upstream URL for a request path and query
    pub fn target_url(&self, path: &str, query: &str) -> Url {
        let mut url = self.upstream.clone();

        let base = self.upstream.path().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        url.set_path(&format!("{}/{}", base, path));
        url.set_query(if query.is_empty() { None } else { Some(query) });
        url
    }

    /// Forward `req` with `body` and relay the upstream response
    pub async fn forward(&self, req: &HttpRequest, body: Bytes) -> Result<HttpResponse> {
        let url = self.target_url(req.path(), req.query_string());
        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
            .map_err(|e| GatewayError::bad_request(format!("unsupported method: {}", e)))?;

        debug!(method = %method, url = %url, "forwarding request upstream");

        let response = self
            .client
            .request(method, url)
            .headers(forward_headers(req))
            .body(body)
            .send()
            .await?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| GatewayError::internal(format!("invalid upstream status: {}", e)))?;
        let mut builder = HttpResponse::build(status);
        for (name, value) in response.headers() {
            if is_hop_by_hop(name.as_str()) || *name == reqwest::header::CONTENT_LENGTH {
                continue;
            }
            if let (Ok(name), Ok(value)) = (
                ActixHeaderName::from_bytes(name.as_str().as_bytes()),
                ActixHeaderValue::from_bytes(value.as_bytes()),
            ) {
                builder.append_header((name, value));
            }
        }

        Ok(builder.streaming(response.bytes_stream()))
    }
}

/// End-to-end request headers plus the caller appended to `X-Forwarded-For`
fn forward_headers(req: &HttpRequest) -> HeaderMap {
    let listed = connection_tokens(req);
    let mut headers = HeaderMap::new();
    for (name, value) in req.headers() {
        // header names are already lowercase
        let name = name.as_str();
        if is_hop_by_hop(name)
            || listed.iter().any(|token| token == name)
            || name == "host"
            || name.eq_ignore_ascii_case("content-length")
            || name.eq_ignore_ascii_case(X_FORWARDED_FOR)
        {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }

    let prior: Vec<&str> = req
        .headers()
        .get_all(X_FORWARDED_FOR)
        .filter_map(|value| value.to_str().ok())
        .collect();
    let peer = req.peer_addr().map(|addr| addr.ip().to_string());

    let forwarded = match (prior.is_empty(), peer) {
        (true, Some(peer)) => Some(peer),
        (false, Some(peer)) => Some(format!("{}, {}", prior.join(", "), peer)),
        (false, None) => Some(prior.join(", ")),
        (true, None) => None,
    };
    if let Some(value) = forwarded.and_then(|v| HeaderValue::from_str(&v).ok()) {
        headers.insert(HeaderName::from_static(X_FORWARDED_FOR), value);
    }

    let forwarded_host = HeaderName::from_static(X_FORWARDED_HOST);
    if !headers.contains_key(&forwarded_host) {
        if let Some(host) = req
            .headers()
            .get("host")
            .and_then(|value| HeaderValue::from_bytes(value.as_bytes()).ok())
        {
            headers.insert(forwarded_host, host);
        }
    }

    headers
}

/// Forwards through the upstream proxy
struct Forward<'a> {
    proxy: &'a UpstreamProxy,
    req: &'a HttpRequest,
    body: Bytes,
}

#[async_trait(?Send)]
impl<'a> Continuation for Forward<'a> {
    type Output = HttpResponse;

    fn request(&self) -> &HttpRequest {
        self.req
    }

    async fn proceed(self) -> HttpResponse {
        match self.proxy.forward(self.req, self.body).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, upstream = %self.proxy.upstream, "proxy error");
                e.error_response()
            }
        }
    }

    fn reject(self, response: HttpResponse) -> HttpResponse {
        response
    }

    fn annotate(output: &mut HttpResponse, headers: &RateLimitHeaders) {
        headers.apply(output.headers_mut());
    }
}

/// Catch-all handler: gate, then forward
pub async fn proxy_request(
    req: HttpRequest,
    body: web::Bytes,
    gate: web::Data<AdmissionGate>,
    proxy: web::Data<UpstreamProxy>,
) -> HttpResponse {
    let next = Forward {
        proxy: proxy.get_ref(),
        req: &req,
        body,
    };
    gate.admit(next).await
}
