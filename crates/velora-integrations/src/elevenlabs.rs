//! ElevenLabs voice API client
//!
//! Two operations are proxied: conversational-AI outbound calls placed over
//! the Twilio bridge, and plain text-to-speech returning audio bytes.

use crate::error::IntegrationError;
use crate::http::{build_client, join_url, transport_error};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};
use velora_core::config::ElevenLabsConfig;

/// Longest text accepted by text-to-speech
pub const MAX_TTS_TEXT_CHARS: usize = 5000;

pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

pub const TTS_MODEL_ID: &str = "eleven_monolingual_v1";

const API_KEY_HEADER: &str = "xi-api-key";
const OUTBOUND_CALL_PATH: &str = "v1/convai/twilio/outbound-call";

/// Outbound call payload in the vendor's field names
#[derive(Debug, Clone, Serialize)]
pub struct OutboundCallRequest {
    pub agent_id: String,
    pub agent_phone_number_id: String,
    pub to_number: String,
}

/// Vendor answer to an outbound call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutboundCall {
    pub conversation_id: Option<String>,
    #[serde(rename = "callSid")]
    pub call_sid: Option<String>,
    #[serde(default)]
    pub success: bool,
}

/// Synthesized audio
#[derive(Debug, Clone)]
pub struct Speech {
    pub audio: Vec<u8>,
    pub format: String,
    pub voice_id: String,
}

impl Speech {
    pub fn audio_base64(&self) -> String {
        STANDARD.encode(&self.audio)
    }
}

pub struct ElevenLabsClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
    default_voice_id: String,
}

impl ElevenLabsClient {
    pub fn new(config: &ElevenLabsConfig) -> Result<Self, IntegrationError> {
        Ok(Self {
            http_client: build_client(config.timeout_secs, false)?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            default_voice_id: config.default_voice_id.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn default_voice_id(&self) -> &str {
        &self.default_voice_id
    }

    fn api_key(&self) -> Result<&str, IntegrationError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| IntegrationError::NotConfigured("ELEVENLABS_API_KEY".to_string()))
    }

    /// Start an AI agent call to `to_number`
    #[instrument(skip(self, request), fields(agent_id = %request.agent_id))]
    pub async fn outbound_call(
        &self,
        request: &OutboundCallRequest,
    ) -> Result<OutboundCall, IntegrationError> {
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .post(join_url(&self.base_url, OUTBOUND_CALL_PATH))
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error("ElevenLabs API", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("ElevenLabs API", e))?;

        if !status.is_success() {
            error!("ElevenLabs API error: status={} body={}", status, body);
            return Err(IntegrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let call: OutboundCall = serde_json::from_str(&body)
            .map_err(|e| IntegrationError::InvalidResponse(e.to_string()))?;
        info!(
            "Outbound call requested: conversation={:?} success={}",
            call.conversation_id, call.success
        );
        Ok(call)
    }

    /// Synthesize `text`, falling back to the configured voice and MP3
    #[instrument(skip(self, text), fields(text_length = text.chars().count()))]
    pub async fn text_to_speech(
        &self,
        text: &str,
        voice_id: Option<&str>,
        output_format: Option<&str>,
    ) -> Result<Speech, IntegrationError> {
        let api_key = self.api_key()?;
        let voice_id = voice_id
            .filter(|v| !v.is_empty())
            .unwrap_or(&self.default_voice_id)
            .to_string();
        let format = output_format
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_OUTPUT_FORMAT)
            .to_string();

        let payload = json!({
            "text": text,
            "model_id": TTS_MODEL_ID,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.75,
            },
        });

        let response = self
            .http_client
            .post(join_url(&self.base_url, &format!("v1/text-to-speech/{}", voice_id)))
            .query(&[("output_format", format.as_str())])
            .header(API_KEY_HEADER, api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "audio/mpeg")
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error("ElevenLabs API", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("ElevenLabs TTS error: status={}", status);
            return Err(IntegrationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| transport_error("ElevenLabs API", e))?
            .to_vec();
        info!("Synthesized {} bytes of {} audio", audio.len(), format);

        Ok(Speech {
            audio,
            format,
            voice_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_call_deserialize() {
        let call: OutboundCall = serde_json::from_str(
            r#"{"conversation_id":"conv_1","callSid":"CA123","success":true}"#,
        )
        .unwrap();
        assert_eq!(call.conversation_id.as_deref(), Some("conv_1"));
        assert_eq!(call.call_sid.as_deref(), Some("CA123"));
        assert!(call.success);

        let call: OutboundCall = serde_json::from_str("{}").unwrap();
        assert!(!call.success);
    }

    #[test]
    fn test_speech_base64() {
        let speech = Speech {
            audio: b"ID3".to_vec(),
            format: DEFAULT_OUTPUT_FORMAT.to_string(),
            voice_id: "v".to_string(),
        };
        assert_eq!(speech.audio_base64(), "SUQz");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = ElevenLabsClient::new(&ElevenLabsConfig {
            api_key: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(!client.is_configured());

        let err = client.text_to_speech("merhaba", None, None).await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured(_)));
    }
}
