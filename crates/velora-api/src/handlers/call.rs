//! Active call and call record handlers

use crate::dto::{
    ActiveCallCreateRequest, CallRecordCreateRequest, CallRecordFilterParams, CallRecordResponse,
    SuccessResponse,
};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;
use velora_core::AppError;
use velora_db::{PgActiveCallRepository, PgCallRecordRepository};

/// POST /api/voip-crm/active-calls
#[instrument(skip(pool, req))]
pub async fn create_active_call(
    pool: web::Data<PgPool>,
    req: web::Json<ActiveCallCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Active call validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let repo = PgActiveCallRepository::new(pool.get_ref().clone());
    let created = repo.create(&req.to_active_call()).await?;
    debug!(id = %created.id, caller = %created.caller, callee = %created.callee, "Active call registered");

    Ok(HttpResponse::Ok().json(created))
}

/// GET /api/voip-crm/active-calls
#[instrument(skip(pool))]
pub async fn list_active_calls(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let repo = PgActiveCallRepository::new(pool.get_ref().clone());
    Ok(HttpResponse::Ok().json(repo.list_active().await?))
}

/// DELETE /api/voip-crm/active-calls/{id}
///
/// Marks the call terminated. Unknown ids are acknowledged as well.
#[instrument(skip(pool))]
pub async fn terminate_active_call(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let repo = PgActiveCallRepository::new(pool.get_ref().clone());

    if repo.terminate(id).await? {
        info!(id = %id, "Active call terminated");
    } else {
        warn!(id = %id, "Terminate requested for unknown active call");
    }

    Ok(HttpResponse::Ok().json(SuccessResponse::success("Call terminated")))
}

/// POST /api/voip-crm/call-records
///
/// Adds the call's minutes and one call to the customer's totals.
#[instrument(skip(pool, req))]
pub async fn create_call_record(
    pool: web::Data<PgPool>,
    req: web::Json<CallRecordCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Call record validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let record = req.to_call_record()?;
    let repo = PgCallRecordRepository::new(pool.get_ref().clone());
    let created = repo.create(&record).await?;
    info!(
        id = %created.id,
        customer_id = %created.customer_id,
        duration = %created.display_duration(),
        "Call record stored"
    );

    Ok(HttpResponse::Ok().json(CallRecordResponse::from(created)))
}

/// GET /api/voip-crm/call-records?customer_id=&limit=100
#[instrument(skip(pool))]
pub async fn list_call_records(
    pool: web::Data<PgPool>,
    query: web::Query<CallRecordFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let repo = PgCallRecordRepository::new(pool.get_ref().clone());
    let records: Vec<CallRecordResponse> = repo
        .list(query.customer_id, query.limit)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(HttpResponse::Ok().json(records))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/active-calls")
            .route(web::post().to(create_active_call))
            .route(web::get().to(list_active_calls)),
    )
    .route("/active-calls/{id}", web::delete().to(terminate_active_call))
    .service(
        web::resource("/call-records")
            .route(web::post().to(create_call_record))
            .route(web::get().to(list_call_records)),
    );
}
