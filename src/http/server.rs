//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Serve plain HTTP or TLS on a bound listener
//! - Run the cache sweeper alongside the server
//! - Drain in-flight requests on shutdown

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use axum_server::Handle;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::cache::{CacheSweeper, ResponseCache};
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::request::UuidRequestId;
use crate::net::tls::load_tls_config;
use crate::pipeline::ForwardingPipeline;

/// How long TLS connections may keep draining after shutdown.
const TLS_DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ForwardingPipeline>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    cache: Arc<ResponseCache>,
}

impl HttpServer {
    /// Create a new HTTP server with its own cache.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let cache = Arc::new(ResponseCache::from_config(&config.cache));
        Self::with_cache(config, cache)
    }

    /// Create a server sharing an existing cache (e.g. with the admin API).
    pub fn with_cache(config: ProxyConfig, cache: Arc<ResponseCache>) -> Result<Self, ProxyError> {
        let pipeline = Arc::new(ForwardingPipeline::new(&config, Arc::clone(&cache))?);
        let router = Self::build_router(AppState { pipeline });
        Ok(Self { router, config, cache })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain and return.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        let tls = match &self.config.listener.tls {
            Some(tls) => Some(load_tls_config(tls).await?),
            None => None,
        };

        let sweeper = self.config.cache.enabled.then(|| {
            CacheSweeper::new(Arc::clone(&self.cache), self.config.cache.sweep_interval())
                .spawn(shutdown.resubscribe())
        });

        let result = match tls {
            Some(rustls) => {
                tracing::info!(address = %addr, upstream = %self.config.upstream.base_url, "HTTPS server starting");
                let handle = Handle::new();
                let signal = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    signal.graceful_shutdown(Some(TLS_DRAIN_GRACE));
                });
                axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                    .handle(handle)
                    .serve(self.router.into_make_service())
                    .await
            }
            None => {
                tracing::info!(address = %addr, upstream = %self.config.upstream.base_url, "HTTP server starting");
                axum::serve(listener, self.router)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                        tracing::info!("HTTP server draining");
                    })
                    .await
            }
        };

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        tracing::info!("HTTP server stopped");
        result
    }
}

/// Catch-all handler: every method, every path.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.pipeline.handle(request).await
}
