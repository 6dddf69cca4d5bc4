//! Header manipulation and CORS headers.
//!
//! # Responsibilities
//! - Drop client-side proxy and forwarding headers before going upstream
//! - Pin the outbound Host header to the upstream's canonical host
//! - Strip hop-by-hop headers from upstream responses
//! - Add the permissive CORS header set to every response
//!
//! # Design Decisions
//! - Never forward X-Forwarded-* or edge-provider headers from clients
//! - Authorization passes through untouched and is never synthesized
//! - Framing headers are recomputed by the HTTP client, not copied

use axum::http::header::{
    self, HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
};

/// Inbound headers never forwarded to the upstream.
pub const FORWARDING_DENY_LIST: &[&str] = &[
    "host",
    "cf-ray",
    "cf-connecting-ip",
    "cf-visitor",
    "x-forwarded-for",
    "x-forwarded-proto",
    "x-real-ip",
    "connection",
    "upgrade",
    // hop-by-hop and framing
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "content-length",
    // the outbound client negotiates and decodes compression itself
    "accept-encoding",
];

/// Headers that describe a single connection and must not cross the proxy.
pub const HOP_BY_HOP: &[&str] = &[
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

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str =
    "Content-Type, Authorization, X-Requested-With, Accept, Accept-Language";
pub const CORS_MAX_AGE: &str = "86400";

fn in_list(name: &HeaderName, list: &[&str]) -> bool {
    list.contains(&name.as_str())
}

/// Build the header set sent upstream from the inbound headers.
pub fn upstream_request_headers(inbound: &HeaderMap, upstream_host: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if !in_list(name, FORWARDING_DENY_LIST) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers.insert(header::HOST, upstream_host.clone());
    headers
}

/// Build the header set returned to the client from an upstream response.
pub fn downstream_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len() + 4);
    for (name, value) in upstream {
        if !in_list(name, HOP_BY_HOP) {
            headers.append(name.clone(), value.clone());
        }
    }
    apply_cors(&mut headers);
    headers
}

/// Overwrite or add the CORS header set.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(CORS_ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(CORS_ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(CORS_ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(CORS_MAX_AGE));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("proxy.example.com"));
        headers.insert("cf-ray", HeaderValue::from_static("8a1b2c3d"));
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.7"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("authorization", HeaderValue::from_static("Bearer token-123"));
        headers.insert("accept-language", HeaderValue::from_static("zh-CN"));
        headers.append("accept", HeaderValue::from_static("application/json"));
        headers.append("accept", HeaderValue::from_static("text/plain"));
        headers
    }

    #[test]
    fn test_deny_list_is_removed_and_host_pinned() {
        let host = HeaderValue::from_static("api.themoviedb.org");
        let out = upstream_request_headers(&inbound(), &host);

        for denied in ["cf-ray", "cf-connecting-ip", "x-forwarded-for", "x-forwarded-proto", "x-real-ip", "connection"] {
            assert!(!out.contains_key(denied), "{denied} should not be forwarded");
        }
        assert_eq!(out.get(header::HOST).unwrap(), "api.themoviedb.org");
        assert_eq!(out.get_all(header::HOST).iter().count(), 1);
    }

    #[test]
    fn test_authorization_and_multi_values_preserved() {
        let host = HeaderValue::from_static("api.themoviedb.org");
        let out = upstream_request_headers(&inbound(), &host);

        assert_eq!(out.get(header::AUTHORIZATION).unwrap(), "Bearer token-123");
        assert_eq!(out.get(header::ACCEPT_LANGUAGE).unwrap(), "zh-CN");
        assert_eq!(out.get_all(header::ACCEPT).iter().count(), 2);
    }

    #[test]
    fn test_authorization_never_fabricated() {
        let host = HeaderValue::from_static("api.themoviedb.org");
        let out = upstream_request_headers(&HeaderMap::new(), &host);
        assert!(!out.contains_key(header::AUTHORIZATION));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_response_headers_stripped_and_cors_overwritten() {
        let mut upstream = HeaderMap::new();
        upstream.insert("content-type", HeaderValue::from_static("application/json;charset=utf-8"));
        upstream.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        upstream.insert("connection", HeaderValue::from_static("close"));
        upstream.insert("access-control-allow-origin", HeaderValue::from_static("https://www.themoviedb.org"));
        upstream.insert("x-ratelimit-remaining", HeaderValue::from_static("39"));

        let out = downstream_response_headers(&upstream);

        assert!(!out.contains_key("transfer-encoding"));
        assert!(!out.contains_key("connection"));
        assert_eq!(out.get("x-ratelimit-remaining").unwrap(), "39");
        assert_eq!(out.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(out.get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(), CORS_ALLOW_METHODS);
        assert_eq!(out.get(ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");
    }
}
