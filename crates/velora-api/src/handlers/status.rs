//! Root, health and status check handlers

use crate::dto::{HealthResponse, MessageResponse, StatusCheckCreateRequest};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use validator::Validate;
use velora_core::{models::StatusCheck, AppError};
use velora_db::PgStatusCheckRepository;

/// GET /api/
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: "Hello World".to_string(),
    })
}

/// GET /api/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "velora-crm",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /api/status
#[instrument(skip(pool, req))]
pub async fn create_status_check(
    pool: web::Data<PgPool>,
    req: web::Json<StatusCheckCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Status check validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let repo = PgStatusCheckRepository::new(pool.get_ref().clone());
    let created = repo.create(&StatusCheck::new(&req.client_name)).await?;
    debug!(id = %created.id, "Status check recorded");

    Ok(HttpResponse::Ok().json(created))
}

/// GET /api/status
#[instrument(skip(pool))]
pub async fn list_status_checks(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let repo = PgStatusCheckRepository::new(pool.get_ref().clone());
    let checks = repo.list().await?;
    Ok(HttpResponse::Ok().json(checks))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .service(
            web::resource("/status")
                .route(web::post().to(create_status_check))
                .route(web::get().to(list_status_checks)),
        );
}
