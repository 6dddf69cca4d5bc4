//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to the HTTP server, pipeline and cache at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, CacheConfig, HealthConfig, ListenerConfig, ObservabilityConfig, ProxyConfig,
    SecurityConfig, TlsConfig, UpstreamConfig, DEFAULT_UPSTREAM_BASE,
};
pub use validation::{validate_config, ValidationError};
