//! Issabel PBX health handler

use crate::dto::VendorResponse;
use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;
use tracing::{error, instrument};
use velora_integrations::{IntegrationError, IssabelClient};

fn failure_code(err: &IntegrationError) -> &'static str {
    match err {
        e if e.is_transport() => "TIMEOUT",
        IntegrationError::Status { status: 401, .. } => "UNAUTHORIZED",
        IntegrationError::Status { status: 404, .. } => "NOT_FOUND",
        IntegrationError::InvalidResponse(_) => "AUTH_ERROR",
        _ => "CONNECTION_ERROR",
    }
}

/// GET /api/issabel/health
///
/// Authenticates and reads one extension.
#[instrument(skip(client))]
pub async fn health(client: web::Data<IssabelClient>) -> HttpResponse {
    if !client.is_configured() {
        return HttpResponse::InternalServerError().json(VendorResponse::failure(
            "MISCONFIG",
            "Issabel credentials not configured (ISSABEL_BASE_URL, ISSABEL_USERNAME, ISSABEL_PASSWORD)",
        ));
    }

    match client.health().await {
        Ok(health) => HttpResponse::Ok().json(json!({
            "ok": true,
            "code": "OK",
            "message": "Issabel connection successful",
            "details": {
                "baseUrl": health.base_url,
                "username": health.username,
                "authenticated": true,
                "dataReceived": health.data_received,
            },
        })),
        Err(e) => {
            error!("Issabel health check failed: {}", e);
            HttpResponse::build(StatusCode::BAD_GATEWAY).json(
                VendorResponse::failure(failure_code(&e), format!("Issabel connection failed: {}", e))
                    .with_details(json!({ "baseUrl": client.base_url() })),
            )
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/issabel/health", web::get().to(health));
}
