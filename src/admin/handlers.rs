use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::cache::CacheStats;
use crate::observability::metrics;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub upstream: String,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct PurgeResult {
    pub purged: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        upstream: state.upstream.to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn get_cache(State(state): State<AdminState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

pub async fn purge_cache(State(state): State<AdminState>) -> Json<PurgeResult> {
    let purged = state.cache.clear();
    metrics::record_cache_size(0);
    tracing::info!(purged, "Cache purged via admin API");
    Json(PurgeResult { purged })
}
