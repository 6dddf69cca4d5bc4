//! Admin API.
//!
//! Bearer-authenticated endpoints for inspecting and purging the response
//! cache, served on a separate listener from proxied traffic.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Instant;

use crate::cache::ResponseCache;
use crate::config::ProxyConfig;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub cache: Arc<ResponseCache>,
    pub api_key: Arc<str>,
    pub upstream: Arc<str>,
    pub started_at: Instant,
}

impl AdminState {
    pub fn new(config: &ProxyConfig, cache: Arc<ResponseCache>) -> Self {
        Self {
            cache,
            api_key: Arc::from(config.admin.api_key.as_str()),
            upstream: Arc::from(config.upstream.base_url.as_str()),
            started_at: Instant::now(),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/cache", get(get_cache).delete(purge_cache))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> AdminState {
        let mut config = ProxyConfig::default();
        config.admin.api_key = "admin-secret-key".into();
        AdminState::new(&config, Arc::new(ResponseCache::new(10, Duration::from_secs(60))))
    }

    fn request(method: Method, uri: &str, key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_requests_without_valid_key_rejected() {
        let router = setup_admin_router(state());

        let missing = router.clone().oneshot(request(Method::GET, "/admin/status", None)).await.unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = router.oneshot(request(Method::GET, "/admin/status", Some("nope"))).await.unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_status_reports_upstream() {
        let router = setup_admin_router(state());
        let response = router
            .oneshot(request(Method::GET, "/admin/status", Some("admin-secret-key")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "operational");
        assert_eq!(body["upstream"], "https://api.themoviedb.org");
    }

    #[tokio::test]
    async fn test_cache_inspect_and_purge() {
        let state = state();
        state.cache.insert("/3/movie/550", json!({ "id": 550 }));
        state.cache.insert("/3/movie/551", json!({ "id": 551 }));
        let router = setup_admin_router(state.clone());

        let stats = router
            .clone()
            .oneshot(request(Method::GET, "/admin/cache", Some("admin-secret-key")))
            .await
            .unwrap();
        let body = body_json(stats).await;
        assert_eq!(body["entries"], 2);
        assert_eq!(body["max_entries"], 10);
        assert_eq!(body["insertions"], 2);

        let purge = router
            .oneshot(request(Method::DELETE, "/admin/cache", Some("admin-secret-key")))
            .await
            .unwrap();
        assert_eq!(purge.status(), StatusCode::OK);
        assert_eq!(body_json(purge).await["purged"], 2);
        assert!(state.cache.is_empty());
    }
}
