//! Upstream subsystem.
//!
//! One fixed origin; no routing, pooling across origins, or load balancing.

pub mod client;

pub use client::UpstreamClient;
