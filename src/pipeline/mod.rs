//! Request forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → OPTIONS: preflight answered locally
//!     → health path: status document answered locally
//!     → GET with a fresh cache entry: served from cache (X-Cache: HIT)
//!     → otherwise forward.rs:
//!         buffer body → filter headers → race upstream exchange vs deadline
//!         → 200 GET: parse JSON, store, answer (X-Cache: MISS)
//!         → anything else: stream status and body through
//!     → failures: JSON error envelope (504 or 502)
//! ```
//!
//! # Design Decisions
//! - The pipeline owns no globals; cache and client are injected
//! - The cache write happens only after the exchange won the race

pub mod forward;

pub use forward::ForwardingPipeline;
