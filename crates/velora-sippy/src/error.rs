//! Softswitch client errors

use crate::value::Value;
use thiserror::Error;

/// Longest response body excerpt kept in [`SippyError::HttpStatus`]
pub(crate) const BODY_EXCERPT_CHARS: usize = 200;

/// Errors of the SippySoft XML-RPC client
#[derive(Debug, Error)]
pub enum SippyError {
    #[error("Connection error: {0}")]
    Network(String),

    #[error("Timeout: no response within {0}s")]
    Timeout(u64),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid XML-RPC response: {0}")]
    Parse(String),

    #[error("XML-RPC fault: {0}")]
    Fault(Value),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SippyError {
    /// Transport failure, as opposed to an answer from the softswitch
    pub fn is_network(&self) -> bool {
        matches!(self, SippyError::Network(_) | SippyError::Timeout(_))
    }

    pub(crate) fn http_status(status: u16, body: &str) -> Self {
        SippyError::HttpStatus {
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_body_truncated() {
        let body = "é".repeat(500);
        match SippyError::http_status(500, &body) {
            SippyError::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), BODY_EXCERPT_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_network() {
        assert!(SippyError::Timeout(30).is_network());
        assert!(SippyError::Network("refused".to_string()).is_network());
        assert!(!SippyError::Parse("bad".to_string()).is_network());
        assert!(!SippyError::http_status(401, "").is_network());
    }
}
