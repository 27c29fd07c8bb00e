//! Chatbot handlers

use crate::dto::{ChatHistoryResponse, ChatRequest, ChatResponse, ClearHistoryResponse};
use crate::PgChatService;
use actix_web::{web, HttpResponse};
use tracing::{instrument, warn};
use validator::Validate;
use velora_core::AppError;

/// POST /api/chatbot/chat
///
/// Model and storage failures still answer 200 with a canned reply.
#[instrument(skip(service, req))]
pub async fn chat(
    service: web::Data<PgChatService>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Chat validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let ChatRequest {
        message,
        session_id,
    } = req.into_inner();
    let reply = service.chat(&message, session_id).await;

    Ok(HttpResponse::Ok().json(ChatResponse {
        response: reply.response,
        session_id: reply.session_id,
    }))
}

/// GET /api/chatbot/history/{session_id}
#[instrument(skip(service))]
pub async fn get_history(
    service: web::Data<PgChatService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let messages = service.history(&session_id).await?;

    Ok(HttpResponse::Ok().json(ChatHistoryResponse {
        session_id,
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

/// DELETE /api/chatbot/history/{session_id}
#[instrument(skip(service))]
pub async fn clear_history(
    service: web::Data<PgChatService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let deleted_count = service.clear(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ClearHistoryResponse {
        success: true,
        deleted_count,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chatbot")
            .route("/chat", web::post().to(chat))
            .service(
                web::resource("/history/{session_id}")
                    .route(web::get().to(get_history))
                    .route(web::delete().to(clear_history)),
            ),
    );
}
