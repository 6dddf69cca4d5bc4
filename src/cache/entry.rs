//! A single cached upstream response.

use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Parsed JSON payload of a cached 200 response with its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Path and query the entry was stored under.
    pub key: String,
    /// Parsed upstream body, shared between the store and readers.
    pub payload: Arc<Value>,
    /// Instant at which the entry stops being visible.
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(key: String, payload: Arc<Value>, expires_at: Instant) -> Self {
        Self {
            key,
            payload,
            expires_at,
        }
    }

    /// An entry is visible only while `now < expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining_ttl(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
