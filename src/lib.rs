//! TMDB API proxy library.
//!
//! A caching reverse proxy in front of a single upstream JSON API. Successful
//! GET responses are held in an in-memory TTL cache; everything else streams
//! through with client headers filtered and CORS applied.

pub mod admin;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod pipeline;
pub mod resilience;
pub mod security;
pub mod upstream;

pub use cache::ResponseCache;
pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::ForwardingPipeline;
