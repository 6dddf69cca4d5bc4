//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID and trace layers)
//!     → request.rs (request ID, cache key, method classification)
//!     → [pipeline decides: local answer, cache, or upstream]
//!     → response.rs (CORS, cache header, error envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{CacheStatus, X_CACHE};
pub use server::{AppState, HttpServer};
