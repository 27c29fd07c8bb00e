//! ElevenLabs, Issabel and MM DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;
use velora_integrations::{AddNumbersToCall, OutboundCallRequest};

/// Outbound call body in the frontend's camelCase
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCallBody {
    #[validate(length(min = 1))]
    pub agent_id: String,

    #[validate(length(min = 1))]
    pub agent_phone_number_id: String,

    #[validate(length(min = 1))]
    pub to_number: String,
}

impl From<OutboundCallBody> for OutboundCallRequest {
    fn from(body: OutboundCallBody) -> Self {
        Self {
            agent_id: body.agent_id,
            agent_phone_number_id: body.agent_phone_number_id,
            to_number: body.to_number,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCallData {
    pub conversation_id: Option<String>,
    pub call_sid: Option<String>,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundCallResponse {
    pub success: bool,
    pub message: String,
    pub data: OutboundCallData,
}

/// Text-to-speech body; `text` is checked in the handler
#[derive(Debug, Clone, Deserialize)]
pub struct TtsRequest {
    pub text: Option<String>,
    pub voice_id: Option<String>,
    pub output_format: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TtsData {
    pub audio: String,
    pub format: String,
    pub voice_id: String,
    pub text_length: usize,
}

/// `{ok, code, message?, data?, details?}` envelope of the TTS and Issabel routes
#[derive(Debug, Clone, Serialize)]
pub struct VendorResponse<T: Serialize> {
    pub ok: bool,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T: Serialize> VendorResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            ok: true,
            code: "OK",
            message: None,
            data: Some(data),
            details: None,
        }
    }
}

impl VendorResponse<()> {
    pub fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code,
            message: Some(message.into()),
            data: None,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddNumbersRequest {
    #[validate(length(min = 1))]
    pub aiid: String,

    #[validate(length(min = 1, message = "content must list at least one number"))]
    pub content: String,

    pub stime: String,
    pub etime: String,
}

impl From<AddNumbersRequest> for AddNumbersToCall {
    fn from(req: AddNumbersRequest) -> Self {
        Self {
            aiid: req.aiid,
            content: req.content,
            stime: req.stime,
            etime: req.etime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_body_camel_case() {
        let body: OutboundCallBody = serde_json::from_value(serde_json::json!({
            "agentId": "a1",
            "agentPhoneNumberId": "p1",
            "toNumber": "+905551112233"
        }))
        .unwrap();
        let request = OutboundCallRequest::from(body);
        assert_eq!(request.agent_phone_number_id, "p1");
    }

    #[test]
    fn test_vendor_failure_shape() {
        let json = serde_json::to_value(
            VendorResponse::failure("MISCONFIG", "missing").with_details(serde_json::json!("x")),
        )
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ok": false, "code": "MISCONFIG", "message": "missing", "details": "x"})
        );
    }
}
