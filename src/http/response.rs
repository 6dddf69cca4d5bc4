//! Response construction.
//!
//! # Responsibilities
//! - Local answers: CORS preflight and the health document
//! - JSON responses for cache hits and cache-populating misses
//! - Streamed passthrough of other upstream responses
//! - The JSON error envelope for gateway failures
//!
//! # Design Decisions
//! - Every response carries the CORS header set
//! - Streaming responses avoid buffering the upstream body
//! - Hop-by-hop headers stripped from upstream responses

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cache::CacheEntry;
use crate::security::headers::{apply_cors, downstream_response_headers};

/// Header reporting whether a response came from the cache.
pub const X_CACHE: &str = "x-cache";

/// Cache disposition of a JSON response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    fn header_value(self) -> HeaderValue {
        match self {
            CacheStatus::Hit => HeaderValue::from_static("HIT"),
            CacheStatus::Miss => HeaderValue::from_static("MISS"),
        }
    }
}

/// Gateway error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub status_code: u16,
    pub status_message: &'static str,
}

fn with_cors(mut response: Response) -> Response {
    apply_cors(response.headers_mut());
    response
}

/// 200 with an empty body and the CORS headers.
pub fn preflight() -> Response {
    with_cors(StatusCode::OK.into_response())
}

/// Local status document for health probes.
pub fn health(service: &str, target: &str) -> Response {
    let body = json!({
        "status": "ok",
        "service": service,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "target": target,
    });
    with_cors((StatusCode::OK, Json(body)).into_response())
}

/// 200 with a parsed JSON payload re-serialized.
pub fn cached_json(payload: &Value, cache: CacheStatus) -> Response {
    let mut response = with_cors((StatusCode::OK, Json(payload)).into_response());
    response.headers_mut().insert(X_CACHE, cache.header_value());
    response
}

/// Cache hit: the stored payload, with `max-age` set to the entry's remaining TTL.
pub fn cache_hit(entry: &CacheEntry) -> Response {
    let mut response = cached_json(&entry.payload, CacheStatus::Hit);
    let max_age = format!("max-age={}", entry.remaining_ttl().as_secs());
    if let Ok(value) = HeaderValue::from_str(&max_age) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    response
}

/// Upstream status and body passed through, headers normalized.
pub fn streamed(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = downstream_response_headers(upstream.headers());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// JSON error envelope with CORS headers.
pub fn error_envelope(status: StatusCode, message: &'static str) -> Response {
    let body = ErrorEnvelope {
        success: false,
        status_code: status.as_u16(),
        status_message: message,
    };
    with_cors((status, Json(body)).into_response())
}
