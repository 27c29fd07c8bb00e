//! Shared reqwest plumbing

use crate::error::IntegrationError;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const USER_AGENT: &str = concat!("velora-integrations/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(
    timeout_secs: u64,
    accept_invalid_certs: bool,
) -> Result<Client, IntegrationError> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .user_agent(USER_AGENT)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| IntegrationError::Connection(format!("failed to build HTTP client: {}", e)))
}

pub(crate) fn transport_error(service: &str, e: reqwest::Error) -> IntegrationError {
    if e.is_timeout() {
        IntegrationError::Timeout(format!("{} did not respond in time", service))
    } else {
        IntegrationError::Connection(format!("{}: {}", service, e))
    }
}

/// `base` without trailing slashes joined with `path`
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://a:81/", "/_api/x.php"), "http://a:81/_api/x.php");
        assert_eq!(join_url("http://a", "v1/voices"), "http://a/v1/voices");
    }
}
