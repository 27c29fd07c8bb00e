//! ElevenLabs outbound call and text-to-speech handlers

use super::{upstream_error, vendor_status};
use crate::dto::{
    OutboundCallBody, OutboundCallData, OutboundCallResponse, TtsData, TtsRequest, VendorResponse,
};
use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;
use tracing::{error, info, instrument, warn};
use validator::Validate;
use velora_core::AppError;
use velora_integrations::{ElevenLabsClient, IntegrationError, MAX_TTS_TEXT_CHARS};

/// POST /api/elevenlabs/outbound-call
#[instrument(skip(client, body))]
pub async fn outbound_call(
    client: web::Data<ElevenLabsClient>,
    body: web::Json<OutboundCallBody>,
) -> Result<HttpResponse, AppError> {
    body.validate().map_err(|e| {
        warn!("Outbound call validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let request = body.into_inner().into();
    match client.outbound_call(&request).await {
        Ok(call) => {
            let status = if call.success { "initiated" } else { "failed" };
            Ok(HttpResponse::Ok().json(OutboundCallResponse {
                success: true,
                message: "Outbound call initiated successfully".to_string(),
                data: OutboundCallData {
                    conversation_id: call.conversation_id,
                    call_sid: call.call_sid,
                    status,
                },
            }))
        }
        Err(IntegrationError::Timeout(_)) => Ok(upstream_error(
            StatusCode::GATEWAY_TIMEOUT,
            "UPSTREAM_TIMEOUT",
            "ElevenLabs API timeout",
            serde_json::Value::Null,
        )),
        Err(IntegrationError::Connection(msg)) => Ok(upstream_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "CONNECTION_ERROR",
            "Could not connect to ElevenLabs API",
            json!(msg),
        )),
        Err(e @ IntegrationError::Status { .. }) => {
            let status = vendor_status(e.status().unwrap_or(502));
            Ok(upstream_error(
                status,
                "ElevenLabs API error",
                e.to_string(),
                e.body_json().unwrap_or_default(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Error code for a vendor status on the TTS route
fn tts_error_code(status: u16) -> &'static str {
    match status {
        401 => "UNAUTHORIZED",
        429 => "RATE_LIMIT",
        403 => "FORBIDDEN",
        400 => "BAD_REQUEST",
        404 => "NOT_FOUND",
        _ => "API_ERROR",
    }
}

fn tts_failure(status: StatusCode, code: &'static str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(VendorResponse::failure(code, message))
}

/// POST /api/elevenlabs/tts
///
/// Answers `{ok, code, data}` with the audio as base64.
#[instrument(skip(client, req))]
pub async fn text_to_speech(
    client: web::Data<ElevenLabsClient>,
    req: web::Json<TtsRequest>,
) -> HttpResponse {
    let TtsRequest {
        text,
        voice_id,
        output_format,
    } = req.into_inner();

    let text = match text.filter(|t| !t.trim().is_empty()) {
        Some(text) => text,
        None => return tts_failure(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Text is required"),
    };
    let text_length = text.chars().count();
    if text_length > MAX_TTS_TEXT_CHARS {
        return tts_failure(
            StatusCode::BAD_REQUEST,
            "PAYLOAD_TOO_LARGE",
            format!("Text too long (max {} characters)", MAX_TTS_TEXT_CHARS),
        );
    }
    if !client.is_configured() {
        return tts_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "MISCONFIG",
            "ElevenLabs API key not configured",
        );
    }

    match client
        .text_to_speech(&text, voice_id.as_deref(), output_format.as_deref())
        .await
    {
        Ok(speech) => {
            info!("Synthesized {} bytes of {}", speech.audio.len(), speech.format);
            HttpResponse::Ok().json(VendorResponse::data(TtsData {
                audio: speech.audio_base64(),
                format: speech.format,
                voice_id: speech.voice_id,
                text_length,
            }))
        }
        Err(e) if e.is_transport() => {
            error!("ElevenLabs TTS transport error: {}", e);
            tts_failure(StatusCode::BAD_GATEWAY, "TIMEOUT", e.to_string())
        }
        Err(e @ IntegrationError::Status { .. }) => {
            let status = e.status().unwrap_or(502);
            let details = e
                .body_json()
                .and_then(|body| body.get("detail").cloned())
                .unwrap_or_else(|| json!(e.to_string()));
            HttpResponse::build(vendor_status(status)).json(
                VendorResponse::failure(tts_error_code(status), "ElevenLabs API error")
                    .with_details(details),
            )
        }
        Err(e) => {
            error!("ElevenLabs TTS failed: {}", e);
            tts_failure(StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR", e.to_string())
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/elevenlabs")
            .route("/outbound-call", web::post().to(outbound_call))
            .route("/tts", web::post().to(text_to_speech)),
    );
}
