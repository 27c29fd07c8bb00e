//! OpenAI-compatible chat completions client

use crate::error::IntegrationError;
use crate::http::{build_client, join_url, transport_error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use velora_core::config::LlmConfig;

/// One message of a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: String,
    pub content: String,
}

impl LlmMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: LlmMessage,
}

pub struct LlmClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    system_prompt: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, IntegrationError> {
        Ok(Self {
            http_client: build_client(config.timeout_secs, false)?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Send `messages` and return the first choice's content
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    pub async fn complete(&self, messages: &[LlmMessage]) -> Result<String, IntegrationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| IntegrationError::NotConfigured("LLM_API_KEY".to_string()))?;

        let response = self
            .http_client
            .post(join_url(&self.base_url, "chat/completions"))
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await
            .map_err(|e| transport_error("LLM API", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("LLM API", e))?;

        if !status.is_success() {
            error!("LLM API error: status={}", status);
            return Err(IntegrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| IntegrationError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| IntegrationError::InvalidResponse("no choices returned".to_string()))?;

        debug!("LLM reply: {} chars", content.chars().count());
        Ok(content)
    }
}
