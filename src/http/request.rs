//! Request handling and classification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Derive the cache key from the request URI
//! - Classify methods (body-carrying, cacheable)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The cache key ignores method and body; only GET reads or fills the cache

use axum::http::{HeaderMap, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of an inbound request, `"unknown"` when absent.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Path plus query string, verbatim. An empty query is dropped.
///
/// This is both the cache key and the path forwarded upstream.
pub fn cache_key(uri: &Uri) -> String {
    match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", uri.path(), query),
        _ => uri.path().to_string(),
    }
}

/// Whether the inbound body is forwarded for this method.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// Whether responses to this method are served from and stored in the cache.
pub fn is_cacheable(method: &Method) -> bool {
    method == Method::GET
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    #[test]
    fn test_cache_key_is_path_and_query() {
        let uri: Uri = "/3/movie/550?language=en-US&page=2".parse().unwrap();
        assert_eq!(cache_key(&uri), "/3/movie/550?language=en-US&page=2");

        let absolute: Uri = "https://proxy.example.com/movie/1?page=2".parse().unwrap();
        assert_eq!(cache_key(&absolute), "/movie/1?page=2");
    }

    #[test]
    fn test_cache_key_ignores_method() {
        let get = request(Method::GET, "/movie/1?page=2");
        let post = request(Method::POST, "/movie/1?page=2");
        assert_eq!(cache_key(get.uri()), cache_key(post.uri()));
        assert_eq!(cache_key(post.uri()), "/movie/1?page=2");
    }

    #[test]
    fn test_cache_key_is_case_sensitive_and_drops_empty_query() {
        let upper: Uri = "/Movie/1".parse().unwrap();
        let lower: Uri = "/movie/1".parse().unwrap();
        assert_ne!(cache_key(&upper), cache_key(&lower));

        let empty_query: Uri = "/movie/1?".parse().unwrap();
        assert_eq!(cache_key(&empty_query), "/movie/1");
        assert_eq!(cache_key(&Uri::from_static("/")), "/");
    }

    #[test]
    fn test_method_classification() {
        assert!(!carries_body(&Method::GET));
        assert!(!carries_body(&Method::HEAD));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::DELETE));

        assert!(is_cacheable(&Method::GET));
        assert!(!is_cacheable(&Method::HEAD));
        assert!(!is_cacheable(&Method::POST));
    }

    #[test]
    fn test_generated_request_ids_are_unique() {
        let mut make = UuidRequestId;
        let req = request(Method::GET, "/");
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
        assert_eq!(a.header_value().len(), 36);
    }

    #[test]
    fn test_request_id_lookup() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }
}
