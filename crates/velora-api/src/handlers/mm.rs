//! MM dialer proxy handler

use super::{upstream_error, vendor_status};
use crate::dto::AddNumbersRequest;
use actix_web::{http::StatusCode, web, HttpResponse};
use tracing::{info, instrument, warn};
use validator::Validate;
use velora_core::AppError;
use velora_integrations::{AddNumbersToCall, IntegrationError, MmClient};

/// POST /api/mm/add_numbers_to_call
#[instrument(skip(client, req), fields(aiid = %req.aiid))]
pub async fn add_numbers_to_call(
    client: web::Data<MmClient>,
    req: web::Json<AddNumbersRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("MM request validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let request = AddNumbersToCall::from(req.into_inner());
    match client.add_numbers_to_call(&request).await {
        Ok(body) => {
            info!("Numbers forwarded to MM");
            Ok(HttpResponse::Ok().json(body))
        }
        Err(IntegrationError::NotConfigured(what)) => Ok(upstream_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "NOT_CONFIGURED",
            format!("{} is not configured", what),
            serde_json::Value::Null,
        )),
        Err(e @ IntegrationError::Status { .. }) => Ok(upstream_error(
            vendor_status(e.status().unwrap_or(502)),
            "MM_API_ERROR",
            "MM API returned an error",
            e.body_json().unwrap_or_default(),
        )),
        Err(e) => Ok(upstream_error(
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_ERROR",
            format!("MM API request failed: {}", e),
            serde_json::Value::Null,
        )),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/mm/add_numbers_to_call", web::post().to(add_numbers_to_call));
}
