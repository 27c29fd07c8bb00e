//! Trunk settings handlers

use crate::dto::TrunkSettingsRequest;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;
use velora_core::{models::TrunkSettings, AppError};
use velora_db::PgTrunkSettingsRepository;

/// POST /api/voip-crm/trunk-settings
///
/// One row per customer; posting again replaces it.
#[instrument(skip(pool, req))]
pub async fn save_trunk_settings(
    pool: web::Data<PgPool>,
    req: web::Json<TrunkSettingsRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Trunk settings validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let settings = TrunkSettings::from(req.into_inner());
    let repo = PgTrunkSettingsRepository::new(pool.get_ref().clone());
    let saved = repo.upsert(&settings).await?;
    info!(customer_id = %saved.customer_id, endpoint = %saved.endpoint(), "Trunk settings saved");

    Ok(HttpResponse::Ok().json(saved))
}

/// GET /api/voip-crm/trunk-settings/{customer_id}
#[instrument(skip(pool))]
pub async fn get_trunk_settings(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();
    let repo = PgTrunkSettingsRepository::new(pool.get_ref().clone());
    let settings = repo
        .find_by_customer(customer_id)
        .await?
        .ok_or_else(|| AppError::TrunkSettingsNotFound(customer_id.to_string()))?;

    Ok(HttpResponse::Ok().json(settings))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/trunk-settings", web::post().to(save_trunk_settings))
        .route("/trunk-settings/{customer_id}", web::get().to(get_trunk_settings));
}
