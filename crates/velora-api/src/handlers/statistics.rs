//! Dashboard statistics handler

use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::instrument;
use velora_core::AppError;
use velora_db::PgStatisticsRepository;

/// GET /api/voip-crm/statistics
#[instrument(skip(pool))]
pub async fn get_statistics(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let repo = PgStatisticsRepository::new(pool.get_ref().clone());
    Ok(HttpResponse::Ok().json(repo.crm_statistics().await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/statistics", web::get().to(get_statistics));
}
