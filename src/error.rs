//! Error types for the forwarding pipeline.
//!
//! Every failure is converted into a JSON envelope at the pipeline boundary;
//! none reach the client as a raw transport error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;
use thiserror::Error;

use crate::http::response;

/// Failure of a single proxied exchange.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream did not answer before the deadline.
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection refused, DNS or TLS failure, or a broken response stream.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// A 200 body that was expected to be JSON was not.
    #[error("upstream returned a malformed JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The upstream target could not be formed from the inbound path.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[from] url::ParseError),

    /// The inbound body exceeded the configured limit or could not be read.
    #[error("request body rejected: {0}")]
    RequestBody(axum::Error),
}

impl ProxyError {
    /// HTTP status returned to the client for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::RequestBody(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Upstream(_) | ProxyError::MalformedBody(_) | ProxyError::InvalidTarget(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Human readable `status_message` of the error envelope.
    pub fn status_message(&self) -> &'static str {
        match self {
            ProxyError::Timeout(_) => "Gateway Timeout",
            ProxyError::RequestBody(_) => "Payload Too Large",
            _ => "Gateway Error",
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Timeout(_) => "timeout",
            ProxyError::Upstream(_) => "network",
            ProxyError::MalformedBody(_) => "malformed_body",
            ProxyError::InvalidTarget(_) => "invalid_target",
            ProxyError::RequestBody(_) => "request_body",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        response::error_envelope(self.status(), self.status_message())
    }
}
