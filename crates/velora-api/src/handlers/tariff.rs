//! Tariff handlers

use crate::dto::{TariffCreateRequest, TariffResponse};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use validator::Validate;
use velora_core::AppError;
use velora_db::PgTariffRepository;

/// POST /api/voip-crm/tariffs
#[instrument(skip(pool, req))]
pub async fn create_tariff(
    pool: web::Data<PgPool>,
    req: web::Json<TariffCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Tariff validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let repo = PgTariffRepository::new(pool.get_ref().clone());
    let created = repo.create(&req.to_tariff()?).await?;
    info!(id = %created.id, name = %created.name, "Tariff created");

    Ok(HttpResponse::Ok().json(TariffResponse::from(created)))
}

/// GET /api/voip-crm/tariffs
#[instrument(skip(pool))]
pub async fn list_tariffs(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let repo = PgTariffRepository::new(pool.get_ref().clone());
    let tariffs: Vec<TariffResponse> = repo.list().await?.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(tariffs))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/tariffs")
            .route(web::post().to(create_tariff))
            .route(web::get().to(list_tariffs)),
    );
}
