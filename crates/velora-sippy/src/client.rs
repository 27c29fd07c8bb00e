//! SippySoft XML-RPC client
//!
//! Every call is a POST of a `methodCall` document. The softswitch answers
//! the first, unauthenticated request with a Digest challenge; the client
//! answers it once and retries. A second rejection is returned as an error.

use crate::digest::{DigestChallenge, NonceSource, RandomNonce};
use crate::error::SippyError;
use crate::request::build_request;
use crate::response::parse_response;
use crate::value::Value;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::{Client, ClientBuilder, Response, StatusCode, Url};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use velora_core::config::SippyConfig;

const USER_AGENT: &str = concat!("velora-sippy/", env!("CARGO_PKG_VERSION"));

/// Parameters of `listAllCalls`
#[derive(Debug, Clone)]
pub struct ListCallsParams {
    /// Customer filter, empty for the root customer
    pub i_customer: String,
    /// Include sub-customer calls
    pub recursive: bool,
    /// `oldest_first`, `oldest_last`, `longest_first` or `longest_last`
    pub order: Option<String>,
}

impl Default for ListCallsParams {
    fn default() -> Self {
        Self {
            i_customer: String::new(),
            recursive: true,
            order: None,
        }
    }
}

impl ListCallsParams {
    fn to_value(&self) -> Value {
        let mut members = BTreeMap::new();
        members.insert("i_customer".to_string(), Value::from(self.i_customer.as_str()));
        members.insert("recursive".to_string(), Value::Boolean(self.recursive));
        if let Some(order) = self.order.as_deref().filter(|o| !o.is_empty()) {
            members.insert("order".to_string(), Value::from(order));
        }
        Value::Struct(members)
    }
}

/// Client for the SippySoft XML-RPC API
pub struct SippyClient {
    http_client: Client,
    rpc_url: String,
    /// Path component of `rpc_url`, used as the Digest `uri`
    uri: String,
    username: String,
    password: String,
    timeout_secs: u64,
    nonce_source: Arc<dyn NonceSource>,
}

impl SippyClient {
    /// Create a client from configuration
    ///
    /// An unconfigured client can be created; its calls fail with
    /// [`SippyError::Config`]. A non-empty but invalid URL is rejected here.
    pub fn new(config: &SippyConfig) -> Result<Self, SippyError> {
        let uri = if config.rpc_url.is_empty() {
            String::new()
        } else {
            Url::parse(&config.rpc_url)
                .map_err(|e| SippyError::Config(format!("invalid rpc_url: {}", e)))?
                .path()
                .to_string()
        };

        let http_client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.disable_tls_verify)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SippyError::Config(e.to_string()))?;

        if config.disable_tls_verify {
            warn!("TLS certificate verification disabled for the softswitch");
        }

        Ok(Self {
            http_client,
            rpc_url: config.rpc_url.clone(),
            uri,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout_secs: config.timeout_secs,
            nonce_source: Arc::new(RandomNonce),
        })
    }

    /// Replace the client nonce generator
    pub fn with_nonce_source(mut self, source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = source;
        self
    }

    /// URL, user and password are all set
    pub fn is_configured(&self) -> bool {
        !self.rpc_url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// First two characters of the user followed by `***`
    pub fn masked_user(&self) -> String {
        let prefix: String = self.username.chars().take(2).collect();
        format!("{}***", prefix)
    }

    /// Execute one XML-RPC method call
    #[instrument(skip(self, params), fields(method = %method, params = params.len()))]
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Value, SippyError> {
        if !self.is_configured() {
            return Err(SippyError::Config(
                "SippySoft credentials not configured".to_string(),
            ));
        }

        let body = build_request(method, params);
        debug!("XML-RPC request: {} bytes", body.len());

        let mut response = self.post(&body, None).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|h| h.to_str().ok())
                .map(DigestChallenge::parse)
                .transpose()?
                .flatten();

            if let Some(challenge) = challenge {
                debug!("Answering Digest challenge for realm {}", challenge.realm);
                let cnonce = self.nonce_source.cnonce();
                let authorization = challenge.authorization(
                    &self.username,
                    &self.password,
                    "POST",
                    &self.uri,
                    &cnonce,
                );
                response = self.post(&body, Some(authorization)).await?;
            }
        }

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if status != StatusCode::OK {
            error!("Softswitch HTTP error: status={}", status);
            return Err(SippyError::http_status(status.as_u16(), &text));
        }

        debug!("XML-RPC response: {} bytes", text.len());
        parse_response(&text)
    }

    /// `system.listMethods`, used as a health probe
    pub async fn list_methods(&self) -> Result<Value, SippyError> {
        self.call("system.listMethods", &[]).await
    }

    /// `listAllCalls`: active calls visible to the configured account
    pub async fn list_all_calls(&self, params: &ListCallsParams) -> Result<Vec<Value>, SippyError> {
        info!(
            "Fetching active calls (i_customer='{}', recursive={}, order={:?})",
            params.i_customer, params.recursive, params.order
        );

        let result = self.call("listAllCalls", &[params.to_value()]).await?;

        match result {
            Value::Array(items) => {
                info!("Fetched {} calls from the softswitch", items.len());
                Ok(items)
            }
            other => {
                warn!("listAllCalls returned a non-array result: {}", other);
                Ok(Vec::new())
            }
        }
    }

    async fn post(&self, body: &str, authorization: Option<String>) -> Result<Response, SippyError> {
        let mut request = self
            .http_client
            .post(&self.rpc_url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body.to_string());

        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        request.send().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> SippyError {
        if e.is_timeout() {
            SippyError::Timeout(self.timeout_secs)
        } else {
            SippyError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> SippyConfig {
        SippyConfig {
            rpc_url: url.to_string(),
            username: "ssp-root".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = SippyClient::new(&config("https://switch.local/xmlapi/xmlapi?x=1")).unwrap();
        assert_eq!(client.uri, "/xmlapi/xmlapi");
        assert!(client.is_configured());
        assert_eq!(client.masked_user(), "ss***");
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            SippyClient::new(&config("not a url")),
            Err(SippyError::Config(_))
        ));
    }

    #[test]
    fn test_unconfigured_client() {
        let client = SippyClient::new(&SippyConfig::default()).unwrap();
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_call_fails_fast() {
        let client = SippyClient::new(&SippyConfig::default()).unwrap();
        assert!(matches!(
            client.list_methods().await,
            Err(SippyError::Config(_))
        ));
    }

    #[test]
    fn test_list_calls_params_value() {
        let params = ListCallsParams {
            i_customer: "12".to_string(),
            recursive: false,
            order: Some("longest_first".to_string()),
        };
        let value = params.to_value();
        let members = value.as_struct().unwrap();
        assert_eq!(members["i_customer"], Value::from("12"));
        assert_eq!(members["recursive"], Value::Boolean(false));
        assert_eq!(members["order"], Value::from("longest_first"));

        let members_default = ListCallsParams::default().to_value();
        assert!(!members_default.as_struct().unwrap().contains_key("order"));
    }
}
