//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the upstream URL, and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::cache::MAX_TTL;
use crate::config::schema::{ProxyConfig, PLACEHOLDER_API_KEY};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.base_url: {0}")]
    InvalidUpstream(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field} must be at most {max} seconds")]
    TooLarge { field: &'static str, max: u64 },

    #[error("admin.api_key must not be empty when the admin API is enabled")]
    MissingApiKey,

    #[error("listener.tls: certificate and key paths are required")]
    IncompleteTls,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() || tls.key_path.trim().is_empty() {
            errors.push(ValidationError::IncompleteTls);
        }
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::InvalidUpstream(format!(
                    "unsupported scheme {:?}",
                    url.scheme()
                )));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::InvalidUpstream("missing host".to_string()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidUpstream(e.to_string())),
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.connect_timeout_secs"));
    }

    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::Zero("cache.ttl_secs"));
    }
    if config.cache.max_entries == 0 {
        errors.push(ValidationError::Zero("cache.max_entries"));
    }
    if config.cache.sweep_interval_secs == Some(0) {
        errors.push(ValidationError::Zero("cache.sweep_interval_secs"));
    }

    check_seconds(&mut errors, "upstream.timeout_secs", config.upstream.timeout_secs);
    check_seconds(&mut errors, "upstream.connect_timeout_secs", config.upstream.connect_timeout_secs);
    check_seconds(&mut errors, "cache.ttl_secs", config.cache.ttl_secs);
    if let Some(secs) = config.cache.sweep_interval_secs {
        check_seconds(&mut errors, "cache.sweep_interval_secs", secs);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::MissingApiKey);
        } else if config.admin.api_key == PLACEHOLDER_API_KEY {
            tracing::warn!("admin API enabled with the placeholder api_key");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_seconds(errors: &mut Vec<ValidationError>, field: &'static str, secs: u64) {
    let max = MAX_TTL.as_secs();
    if secs > max {
        errors.push(ValidationError::TooLarge { field, max });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
