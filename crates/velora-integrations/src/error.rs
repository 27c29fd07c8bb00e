//! Vendor client errors

use thiserror::Error;
use velora_core::AppError;

/// Errors of the vendor HTTP clients
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// Required credentials or URL are missing
    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// The vendor answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl IntegrationError {
    /// The vendor was never reached
    pub fn is_transport(&self) -> bool {
        matches!(self, IntegrationError::Timeout(_) | IntegrationError::Connection(_))
    }

    /// HTTP status returned by the vendor, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            IntegrationError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body decoded as JSON, falling back to the raw text
    pub fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            IntegrationError::Status { body, .. } => Some(
                serde_json::from_str(body)
                    .unwrap_or_else(|_| serde_json::Value::String(body.clone())),
            ),
            _ => None,
        }
    }
}

impl From<IntegrationError> for AppError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::NotConfigured(what) => AppError::NotConfigured(what),
            IntegrationError::Timeout(msg) => AppError::UpstreamTimeout(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }
}
