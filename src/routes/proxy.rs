//! HLS proxy route.
//!
//! Fetches a remote manifest or media segment on behalf of the browser so
//! playback happens under a single origin. Manifest bodies are rewritten so
//! every URI they reference also routes back through here; anything else is
//! streamed through with partial-content semantics intact.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Response, StatusCode},
};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::AppError;
use crate::services::manifest;
use crate::AppState;

// Re-export reqwest header constants to avoid http crate version conflicts
mod reqwest_header {
    pub use reqwest::header::{
        ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, RANGE, REFERER, USER_AGENT,
    };
}

/// Upstream response headers relayed on the binary branch. Covers
/// partial-content delivery plus `content-encoding`, which must survive
/// because the inbound `accept-encoding` was forwarded upstream.
const RELAYED_RESPONSE_HEADERS: [&str; 7] = [
    "content-length",
    "accept-ranges",
    "content-range",
    "cache-control",
    "expires",
    "last-modified",
    "content-encoding",
];

/// Query parameters for the HLS proxy
#[derive(Deserialize)]
pub struct ProxyQuery {
    #[serde(default)]
    pub url: String,
}

/// GET /api/proxy/hls?url=<encoded>
pub async fn hls_proxy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
    headers: HeaderMap,
) -> Result<Response<Body>, AppError> {
    // Target must be an absolute http(s) URL.
    let target = Url::parse(query.url.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| AppError::validation("Missing or invalid url"))?;

    let client = Client::builder()
        .timeout(Duration::from_millis(state.config.hls_proxy_timeout_ms))
        .redirect(reqwest::redirect::Policy::limited(10))
        .danger_accept_invalid_certs(true)
        .build()?;

    let mut request = client.get(target.clone());

    // Forward the request headers panels gate content on.
    match headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        Some(ua) => request = request.header(reqwest_header::USER_AGENT, ua),
        None => {
            request = request.header(reqwest_header::USER_AGENT, state.config.user_agent.as_str())
        }
    }
    match headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        Some(accept) => request = request.header(reqwest_header::ACCEPT, accept),
        None => request = request.header(reqwest_header::ACCEPT, "*/*"),
    }
    if let Some(range) = headers.get(header::RANGE).and_then(|v| v.to_str().ok()) {
        request = request.header(reqwest_header::RANGE, range);
    }
    if let Some(encoding) = headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
    {
        request = request.header(reqwest_header::ACCEPT_ENCODING, encoding);
    }
    request = request.header(
        reqwest_header::REFERER,
        target.origin().ascii_serialization(),
    );

    let upstream = request.send().await?;
    let status = upstream.status().as_u16();

    // Relay upstream failures untouched instead of wrapping them; players
    // handle origin status codes better than a generic 502.
    if !upstream.status().is_success() {
        let body = upstream.text().await.unwrap_or_default();
        return Ok(Response::builder()
            .status(StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY))
            .body(Body::from(body))?);
    }

    let content_type = upstream
        .headers()
        .get(reqwest_header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    if manifest::is_manifest(&content_type, &target) {
        return rewrite_and_respond(upstream, &target).await;
    }

    // Binary branch: relay status (206 included) and the partial-content
    // headers, then stream the body through without buffering it.
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::OK))
        .header(header::CONTENT_TYPE, content_type);
    for name in RELAYED_RESPONSE_HEADERS {
        if let Some(value) = upstream.headers().get(name).and_then(|v| v.to_str().ok()) {
            builder = builder.header(name, value);
        }
    }
    Ok(builder.body(Body::from_stream(upstream.bytes_stream()))?)
}

/// Manifest branch: decode the body as text, rewrite every URI line to
/// point back through the proxy, and respond with a manifest content type.
async fn rewrite_and_respond(
    upstream: reqwest::Response,
    target: &Url,
) -> Result<Response<Body>, AppError> {
    let gzipped = upstream
        .headers()
        .get(reqwest_header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|encoding| encoding.eq_ignore_ascii_case("gzip"));

    let raw = upstream.bytes().await?;
    let text = if gzipped {
        let inflated = manifest::gunzip(&raw)
            .map_err(|e| AppError::Internal(format!("invalid gzip manifest body: {e}")))?;
        String::from_utf8_lossy(&inflated).into_owned()
    } else {
        String::from_utf8_lossy(&raw).into_owned()
    };

    let rewritten = manifest::rewrite_manifest(&text, target);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, manifest::MANIFEST_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(rewritten))?)
}
