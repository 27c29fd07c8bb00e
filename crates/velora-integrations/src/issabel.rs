//! Issabel PBX `pbxapi` client

use crate::error::IntegrationError;
use crate::http::{build_client, join_url, transport_error};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use velora_core::config::IssabelConfig;

const AUTHENTICATE_PATH: &str = "pbxapi/authenticate";
const EXTENSIONS_PATH: &str = "pbxapi/extensions";
const TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Outcome of a successful health probe
#[derive(Debug, Clone)]
pub struct IssabelHealth {
    pub base_url: String,
    pub username: String,
    pub data_received: bool,
}

pub struct IssabelClient {
    http_client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl IssabelClient {
    pub fn new(config: &IssabelConfig) -> Result<Self, IntegrationError> {
        Ok(Self {
            http_client: build_client(TIMEOUT_SECS, config.disable_tls_verify)?,
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            username: config.username.clone().unwrap_or_default(),
            password: config.password.clone().unwrap_or_default(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Exchange the credentials for a bearer token
    async fn authenticate(&self) -> Result<String, IntegrationError> {
        let response = self
            .http_client
            .post(join_url(&self.base_url, AUTHENTICATE_PATH))
            .form(&[("user", self.username.as_str()), ("password", self.password.as_str())])
            .send()
            .await
            .map_err(|e| transport_error("Issabel", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("Issabel", e))?;

        if !status.is_success() {
            error!("Issabel authentication failed: status={}", status);
            return Err(IntegrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(|t| t.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                IntegrationError::InvalidResponse(
                    "No access_token received from Issabel".to_string(),
                )
            })
    }

    /// Authenticate, then fetch one extension
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn health(&self) -> Result<IssabelHealth, IntegrationError> {
        if !self.is_configured() {
            return Err(IntegrationError::NotConfigured(
                "ISSABEL_BASE_URL, ISSABEL_USERNAME and ISSABEL_PASSWORD".to_string(),
            ));
        }

        let token = self.authenticate().await?;
        debug!("Issabel token obtained");

        let response = self
            .http_client
            .get(join_url(&self.base_url, EXTENSIONS_PATH))
            .query(&[("limit", "1")])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error("Issabel", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("Issabel", e))?;

        if !status.is_success() {
            error!("Issabel extensions query failed: status={}", status);
            return Err(IntegrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!("Issabel health check passed");
        Ok(IssabelHealth {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            data_received: !body.trim().is_empty(),
        })
    }
}
