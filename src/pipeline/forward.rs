//! The per-request proxy operation.

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::ResponseCache;
use crate::config::{HealthConfig, ProxyConfig};
use crate::error::ProxyError;
use crate::http::request::{self, cache_key, carries_body, is_cacheable};
use crate::http::response::{self, CacheStatus};
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;
use crate::security::headers::upstream_request_headers;
use crate::upstream::UpstreamClient;

/// Result of an upstream exchange that beat the deadline.
enum Exchange {
    /// A 200 answer to a cacheable request, already parsed.
    Cacheable(Value),
    /// Any other answer, body still unread.
    Streamed(reqwest::Response),
}

/// Serves one inbound request: locally, from cache, or via the upstream.
#[derive(Debug)]
pub struct ForwardingPipeline {
    upstream: UpstreamClient,
    cache: Arc<ResponseCache>,
    cache_enabled: bool,
    timeout: Duration,
    health: HealthConfig,
    max_body_size: usize,
}

impl ForwardingPipeline {
    pub fn new(config: &ProxyConfig, cache: Arc<ResponseCache>) -> Result<Self, ProxyError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        Ok(Self::with_upstream(config, upstream, cache))
    }

    /// Build around an existing upstream client.
    pub fn with_upstream(config: &ProxyConfig, upstream: UpstreamClient, cache: Arc<ResponseCache>) -> Self {
        Self {
            upstream,
            cache,
            cache_enabled: config.cache.enabled,
            timeout: config.upstream.timeout(),
            health: config.health.clone(),
            max_body_size: config.security.max_body_size,
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    fn is_health_path(&self, path: &str) -> bool {
        self.health.paths.iter().any(|p| p == path)
    }

    /// Produce the response for `request`. Never fails: errors become
    /// JSON envelopes.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let request_id = request::request_id(request.headers());
        let method = request.method().clone();

        if method == Method::OPTIONS {
            metrics::record_request(method.as_str(), 200, "preflight", start);
            return response::preflight();
        }

        if self.is_health_path(request.uri().path()) {
            metrics::record_request(method.as_str(), 200, "health", start);
            return response::health(&self.health.service_name, self.upstream.base_url());
        }

        let key = cache_key(request.uri());
        let cacheable = self.cache_enabled && is_cacheable(&method);

        if cacheable {
            let hit = self.cache.lookup(&key);
            metrics::record_cache_lookup(hit.is_some());
            if let Some(entry) = hit {
                tracing::debug!(request_id = %request_id, key = %key, "Cache hit");
                metrics::record_request(method.as_str(), 200, "cache_hit", start);
                return response::cache_hit(&entry);
            }
        }

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %key,
            "Forwarding request upstream"
        );

        let outcome = self.forward(request, &key, cacheable).await;
        match outcome {
            Ok(Exchange::Cacheable(payload)) => {
                let payload = Arc::new(payload);
                self.cache.insert(key, Arc::clone(&payload));
                metrics::record_cache_size(self.cache.len());
                metrics::record_request(method.as_str(), 200, "cache_miss", start);
                response::cached_json(&payload, CacheStatus::Miss)
            }
            Ok(Exchange::Streamed(upstream)) => {
                metrics::record_request(method.as_str(), upstream.status().as_u16(), "forwarded", start);
                response::streamed(upstream)
            }
            Err(err) => {
                tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %key,
                    error = %err,
                    "Upstream exchange failed"
                );
                metrics::record_upstream_failure(err.kind());
                metrics::record_request(method.as_str(), err.status().as_u16(), "error", start);
                err.into_response()
            }
        }
    }

    async fn forward(
        &self,
        request: Request<Body>,
        key: &str,
        cacheable: bool,
    ) -> Result<Exchange, ProxyError> {
        let (parts, body) = request.into_parts();

        let body: Option<Bytes> = if carries_body(&parts.method) {
            Some(
                axum::body::to_bytes(body, self.max_body_size)
                    .await
                    .map_err(ProxyError::RequestBody)?,
            )
        } else {
            None
        };
        let headers = upstream_request_headers(&parts.headers, self.upstream.host_header());

        with_timeout(self.timeout, async {
            let upstream = self.upstream.send(parts.method, key, headers, body).await?;
            if cacheable && upstream.status() == StatusCode::OK {
                let bytes = upstream.bytes().await?;
                Ok(Exchange::Cacheable(serde_json::from_slice(&bytes)?))
            } else {
                Ok(Exchange::Streamed(upstream))
            }
        })
        .await
    }
}
