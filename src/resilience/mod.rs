//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (race the exchange against the deadline)
//!     → deadline wins: exchange dropped, 504 returned
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - A single attempt per request; clients own retry policy

pub mod timeouts;
