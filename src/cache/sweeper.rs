//! Periodic removal of expired cache entries.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::cache::{ResponseCache, MAX_TTL};
use crate::observability::metrics;

/// Background task that sweeps the cache on a fixed period, independent of
/// request traffic, until shutdown is signalled.
pub struct CacheSweeper {
    cache: Arc<ResponseCache>,
    period: Duration,
}

impl CacheSweeper {
    pub fn new(cache: Arc<ResponseCache>, period: Duration) -> Self {
        Self {
            cache,
            period: period.clamp(Duration::from_millis(1), MAX_TTL),
        }
    }

    /// Spawn the sweep loop. The handle resolves once shutdown is observed.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(period = ?self.period, "Cache sweeper starting");

        // First sweep one full period after start.
        let mut ticker = time::interval_at(time::Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.cache.sweep_expired();
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.cache.len(), "Swept expired cache entries");
                    }
                    metrics::record_cache_sweep(removed, self.cache.len());
                }
                _ = shutdown.recv() => {
                    tracing::info!("Cache sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
