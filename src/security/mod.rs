//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (drop forwarding headers, pin Host)
//!     → forwarded upstream
//! Upstream response:
//!     → headers.rs (strip hop-by-hop, add CORS)
//!     → returned to client
//! ```
//!
//! # Design Decisions
//! - No trust in client-supplied forwarding headers
//! - Browser access is opened deliberately with a fixed CORS set

pub mod headers;
