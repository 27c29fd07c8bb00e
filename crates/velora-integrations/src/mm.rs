//! MM dialer partner API client

use crate::error::IntegrationError;
use crate::http::{build_client, join_url, transport_error};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, instrument};
use velora_core::config::MmConfig;

pub const ADD_NUMBERS_PATH: &str = "_api/add_numbers_to_call.php";

const API_KEY_HEADER: &str = "X-API-Key";

/// Number list handed to the dialer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNumbersToCall {
    pub aiid: String,
    pub content: String,
    pub stime: String,
    pub etime: String,
}

pub struct MmClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl MmClient {
    pub fn new(config: &MmConfig) -> Result<Self, IntegrationError> {
        Ok(Self {
            http_client: build_client(config.timeout_secs, false)?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST a JSON payload to `path`
    ///
    /// Non-JSON answers are wrapped as `{status: OK|ERROR, message: <text>}`.
    #[instrument(skip(self, payload))]
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Value, IntegrationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| IntegrationError::NotConfigured("MM_API_KEY".to_string()))?;

        let response = self
            .http_client
            .post(join_url(&self.base_url, path))
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| transport_error("MM API", e))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.to_ascii_lowercase().contains("application/json"));
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("MM API", e))?;

        if !status.is_success() {
            error!("MM API request failed with status {}", status);
            return Err(IntegrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if is_json {
            serde_json::from_str(&body).map_err(|e| IntegrationError::InvalidResponse(e.to_string()))
        } else {
            Ok(json!({ "status": "OK", "message": body }))
        }
    }

    pub async fn add_numbers_to_call(
        &self,
        request: &AddNumbersToCall,
    ) -> Result<Value, IntegrationError> {
        info!("Forwarding number list for aiid {}", request.aiid);
        self.post_json(ADD_NUMBERS_PATH, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key() {
        let client = MmClient::new(&MmConfig::default()).unwrap();
        assert!(!client.is_configured());
        let err = client.post_json("x", &json!({})).await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured(_)));
    }
}
