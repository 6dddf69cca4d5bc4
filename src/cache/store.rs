//! Concurrent response store with TTL expiry and a hard size cap.

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, DEFAULT_TTL, MAX_CACHE_SIZE, MAX_TTL};
use crate::config::CacheConfig;

/// Point-in-time view of the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
    pub expirations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

/// Thread-safe map from cache key to parsed upstream payload.
///
/// Reads and expiry removals lock a single shard. Inserts are serialized so
/// that the size check, eviction and insertion happen as one step and
/// `len() <= max_entries` holds once any insert returns.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    insert_lock: Mutex<()>,
    max_entries: usize,
    ttl: Duration,
    counters: Counters,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(MAX_CACHE_SIZE, DEFAULT_TTL)
    }
}

impl ResponseCache {
    /// Create an empty cache. A capacity of zero is raised to one.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            insert_lock: Mutex::new(()),
            max_entries: max_entries.max(1),
            ttl,
            counters: Counters::default(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl())
    }

    /// Return the entry for `key` if present and unexpired.
    ///
    /// An expired entry found here is removed before returning `None`.
    pub fn lookup(&self, key: &str) -> Option<CacheEntry> {
        self.lookup_at(key, Instant::now())
    }

    pub(crate) fn lookup_at(&self, key: &str, now: Instant) -> Option<CacheEntry> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value().clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            // A concurrent insert may have refreshed the key since the read.
            if self
                .entries
                .remove_if(key, |_, entry| entry.is_expired_at(now))
                .is_some()
            {
                self.counters.expirations.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `payload` under `key` for the configured TTL.
    pub fn insert(&self, key: impl Into<String>, payload: impl Into<Arc<Value>>) {
        self.insert_at(key.into(), payload.into(), self.ttl, Instant::now());
    }

    /// Store `payload` under `key` for an explicit TTL.
    pub fn insert_with_ttl(&self, key: impl Into<String>, payload: impl Into<Arc<Value>>, ttl: Duration) {
        self.insert_at(key.into(), payload.into(), ttl, Instant::now());
    }

    pub(crate) fn insert_at(&self, key: String, payload: Arc<Value>, ttl: Duration, now: Instant) {
        let _guard = self.insert_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            let excess = self.entries.len() + 1 - self.max_entries;
            let evicted = self.evict_soonest_expiring(excess);
            tracing::debug!(evicted, max_entries = self.max_entries, "Cache at capacity, evicted entries");
        }

        let entry = CacheEntry::new(key.clone(), payload, expiry_after(now, ttl));
        self.entries.insert(key, entry);
        self.counters.insertions.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove up to `count` entries, earliest `expires_at` first.
    fn evict_soonest_expiring(&self, count: usize) -> usize {
        let mut candidates: Vec<(Instant, String)> = self
            .entries
            .iter()
            .map(|entry| (entry.expires_at, entry.key().clone()))
            .collect();
        candidates.sort_unstable_by_key(|(expires_at, _)| *expires_at);

        let mut evicted = 0;
        for (_, key) in candidates.into_iter().take(count) {
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }

        self.counters.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        evicted
    }

    /// Remove every entry whose expiry has passed. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub(crate) fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        self.counters.expirations.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Drop every entry. Returns the number removed.
    pub fn clear(&self) -> usize {
        let _guard = self.insert_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Number of resident entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            max_entries: self.max_entries,
            ttl_secs: self.ttl.as_secs(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            insertions: self.counters.insertions.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
        }
    }
}

/// `now + ttl`, with `ttl` clamped to [`MAX_TTL`] so the addition cannot overflow.
fn expiry_after(now: Instant, ttl: Duration) -> Instant {
    let ttl = ttl.min(MAX_TTL);
    now.checked_add(ttl).unwrap_or(now)
}
