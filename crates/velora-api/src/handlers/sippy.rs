//! SippySoft softswitch handlers

use crate::dto::{CallMethodRequest, CallMethodResponse, CdrQueryParams, SippyHealthResponse};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, instrument, warn};
use validator::Validate;
use velora_core::AppError;
use velora_sippy::{normalize_calls, paginate, SippyClient, Value};

/// Methods listed in the health details
const HEALTH_METHODS_SHOWN: usize = 10;

const NOT_CONFIGURED: &str = "SippySoft credentials not configured";

/// Characters of a non-list `system.listMethods` result shown in health
const HEALTH_RAW_CHARS: usize = 100;

/// First few method names, or a clipped rendering when the server did not
/// answer with an array
fn available_methods(methods: &Value) -> serde_json::Value {
    match methods.as_array() {
        Some(list) => json!(list.iter().take(HEALTH_METHODS_SHOWN).collect::<Vec<_>>()),
        None => json!(methods
            .to_string()
            .chars()
            .take(HEALTH_RAW_CHARS)
            .collect::<String>()),
    }
}

/// GET /api/sippy/health
///
/// Probes `system.listMethods`. Always answers 200; `ok` carries the outcome.
#[instrument(skip(client))]
pub async fn health(client: web::Data<SippyClient>) -> HttpResponse {
    if !client.is_configured() {
        warn!("SippySoft health requested without credentials");
        return HttpResponse::Ok().json(SippyHealthResponse {
            ok: false,
            message: NOT_CONFIGURED.to_string(),
            details: json!({ "error": "Missing SIPPY_RPC_URL, SIPPY_RPC_USER or SIPPY_RPC_PASS" }),
        });
    }

    match client.list_methods().await {
        Ok(methods) => {
            let available = available_methods(&methods);
            info!("SippySoft health check passed");

            HttpResponse::Ok().json(SippyHealthResponse {
                ok: true,
                message: "SippySoft XML-RPC connection successful".to_string(),
                details: json!({
                    "rpcUrl": client.rpc_url(),
                    "authMode": "digest",
                    "user": client.masked_user(),
                    "availableMethods": available,
                    "timestamp": Utc::now().to_rfc3339(),
                }),
            })
        }
        Err(e) => {
            error!("SippySoft health check failed: {}", e);
            HttpResponse::Ok().json(SippyHealthResponse {
                ok: false,
                message: format!("SippySoft XML-RPC connection failed: {}", e),
                details: json!({
                    "rpcUrl": client.rpc_url(),
                    "error": e.to_string(),
                    "timestamp": Utc::now().to_rfc3339(),
                }),
            })
        }
    }
}

/// GET /api/sippy/cdrs
///
/// Fetches `listAllCalls` and pages the normalized records locally.
#[instrument(skip(client))]
pub async fn list_cdrs(
    client: web::Data<SippyClient>,
    query: web::Query<CdrQueryParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    if !client.is_configured() {
        return Err(AppError::NotConfigured(NOT_CONFIGURED.to_string()));
    }

    let items = client
        .list_all_calls(&query.list_params())
        .await
        .map_err(|e| {
            error!("listAllCalls failed: {}", e);
            AppError::Internal(format!("Failed to fetch calls from SippySoft: {}", e))
        })?;

    let records = paginate(normalize_calls(&items), query.offset, query.limit);
    info!("Returning {} of {} CDRs", records.len(), items.len());

    Ok(HttpResponse::Ok().json(records))
}

/// POST /api/sippy/call-method
#[instrument(skip(client, req), fields(method = %req.method))]
pub async fn call_method(
    client: web::Data<SippyClient>,
    req: web::Json<CallMethodRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    if !client.is_configured() {
        return Err(AppError::NotConfigured(NOT_CONFIGURED.to_string()));
    }

    let CallMethodRequest { method, params } = req.into_inner();
    let result = client.call(&method, &params).await.map_err(|e| {
        error!("XML-RPC method {} failed: {}", method, e);
        AppError::Internal(format!("Failed to call method: {}", e))
    })?;

    Ok(HttpResponse::Ok().json(CallMethodResponse {
        ok: true,
        method,
        result,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sippy")
            .route("/health", web::get().to(health))
            .route("/cdrs", web::get().to(list_cdrs))
            .route("/call-method", web::post().to(call_method)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_methods_capped() {
        let methods = Value::Array((0..15).map(|i| Value::from(format!("m{}", i))).collect());
        let shown = available_methods(&methods);
        assert_eq!(shown.as_array().map(Vec::len), Some(HEALTH_METHODS_SHOWN));
        assert_eq!(shown[0], "m0");
    }

    #[test]
    fn test_available_methods_not_a_list() {
        assert_eq!(available_methods(&Value::from("x".repeat(250))), json!("x".repeat(100)));
        assert_eq!(available_methods(&Value::Integer(7)), json!("7"));
    }
}
