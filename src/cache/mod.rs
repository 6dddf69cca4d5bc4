//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! GET request
//!     → store.rs lookup (hit: served without touching the upstream)
//!     → miss: upstream 200 JSON body → store.rs insert (evicts at capacity)
//!
//! Background:
//!     sweeper.rs timer → store.rs sweep_expired
//! ```
//!
//! # Design Decisions
//! - Entries expire by wall-clock TTL, checked on every lookup
//! - Periodic sweep bounds staleness under low traffic
//! - Size cap evicts the soonest-expiring entries, not least recently used
//! - The store is injected, never a process global

pub mod entry;
pub mod store;
pub mod sweeper;

use std::time::Duration;

pub use entry::CacheEntry;
pub use store::{CacheStats, ResponseCache};
pub use sweeper::CacheSweeper;

/// Default lifetime of a cached response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Default hard cap on resident entries.
pub const MAX_CACHE_SIZE: usize = 1000;

/// Longest accepted TTL or sweep period. Longer values are clamped.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);
