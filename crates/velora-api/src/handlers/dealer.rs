//! Dealer handlers

use crate::dto::DealerCreateRequest;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;
use velora_core::AppError;
use velora_db::PgDealerRepository;

/// POST /api/voip-crm/dealers
#[instrument(skip(pool, req))]
pub async fn create_dealer(
    pool: web::Data<PgPool>,
    req: web::Json<DealerCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Dealer validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let repo = PgDealerRepository::new(pool.get_ref().clone());
    let created = repo.create(&req.to_dealer()).await?;
    info!(id = %created.id, name = %created.name, "Dealer created");

    Ok(HttpResponse::Ok().json(created))
}

/// GET /api/voip-crm/dealers
#[instrument(skip(pool))]
pub async fn list_dealers(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let repo = PgDealerRepository::new(pool.get_ref().clone());
    Ok(HttpResponse::Ok().json(repo.list().await?))
}

/// GET /api/voip-crm/dealers/{id}
#[instrument(skip(pool))]
pub async fn get_dealer(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let repo = PgDealerRepository::new(pool.get_ref().clone());
    let dealer = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::DealerNotFound(id.to_string()))?;

    Ok(HttpResponse::Ok().json(dealer))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/dealers")
            .route(web::post().to(create_dealer))
            .route(web::get().to(list_dealers)),
    )
    .route("/dealers/{id}", web::get().to(get_dealer));
}
