//! Auto-dialer campaign and script handlers

use crate::dto::{
    CallLogListParams, CampaignCreateRequest, CampaignListParams, CampaignUpdateRequest,
    OkResponse, ScriptCreateRequest, ScriptListParams, StopParams,
};
use crate::PgCampaignService;
use actix_web::{web, HttpResponse};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;
use velora_core::AppError;

/// POST /platinum/campaigns/scripts
#[instrument(skip(service, req))]
pub async fn create_script(
    service: web::Data<PgCampaignService>,
    req: web::Json<ScriptCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Script validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let script = service.create_script(req.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(script))
}

/// GET /platinum/campaigns/scripts?limit=50&skip=0
#[instrument(skip(service))]
pub async fn list_scripts(
    service: web::Data<PgCampaignService>,
    query: web::Query<ScriptListParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(HttpResponse::Ok().json(service.list_scripts(query.limit, query.skip).await?))
}

/// GET /platinum/campaigns/scripts/{id}
#[instrument(skip(service))]
pub async fn get_script(
    service: web::Data<PgCampaignService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get_script(path.into_inner()).await?))
}

/// POST /platinum/campaigns
///
/// Creates the campaign in draft with one pending call log per number.
#[instrument(skip(service, req))]
pub async fn create_campaign(
    service: web::Data<PgCampaignService>,
    req: web::Json<CampaignCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Campaign validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let campaign = service.create_campaign(req.into_inner().into()).await?;
    info!(id = %campaign.id, total = campaign.stats.total, "Campaign created");

    Ok(HttpResponse::Ok().json(campaign))
}

/// GET /platinum/campaigns?status=&limit=50&skip=0
#[instrument(skip(service))]
pub async fn list_campaigns(
    service: web::Data<PgCampaignService>,
    query: web::Query<CampaignListParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    let campaigns = service
        .list_campaigns(query.status, query.limit, query.skip)
        .await?;
    Ok(HttpResponse::Ok().json(campaigns))
}

/// GET /platinum/campaigns/{id}
#[instrument(skip(service))]
pub async fn get_campaign(
    service: web::Data<PgCampaignService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(service.get_campaign(path.into_inner()).await?))
}

/// PATCH /platinum/campaigns/{id}
#[instrument(skip(service, req))]
pub async fn update_campaign(
    service: web::Data<PgCampaignService>,
    path: web::Path<Uuid>,
    req: web::Json<CampaignUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Campaign update validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let campaign = service
        .update_campaign(path.into_inner(), req.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(campaign))
}

/// POST /platinum/campaigns/{id}/start
#[instrument(skip(service))]
pub async fn start_campaign(
    service: web::Data<PgCampaignService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.start(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok("Campaign started")))
}

/// POST /platinum/campaigns/{id}/pause
#[instrument(skip(service))]
pub async fn pause_campaign(
    service: web::Data<PgCampaignService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    service.pause(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok("Campaign paused")))
}

/// POST /platinum/campaigns/{id}/stop?mode=graceful|hard
#[instrument(skip(service))]
pub async fn stop_campaign(
    service: web::Data<PgCampaignService>,
    path: web::Path<Uuid>,
    query: web::Query<StopParams>,
) -> Result<HttpResponse, AppError> {
    let mode = query.mode;
    service.stop(path.into_inner(), mode).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok(format!("Campaign stopped ({} mode)", mode))))
}

/// GET /platinum/campaigns/{id}/calls?status=&limit=100&skip=0
#[instrument(skip(service))]
pub async fn list_campaign_calls(
    service: web::Data<PgCampaignService>,
    path: web::Path<Uuid>,
    query: web::Query<CallLogListParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    let calls = service
        .list_calls(path.into_inner(), query.status, query.limit, query.skip)
        .await?;
    Ok(HttpResponse::Ok().json(calls))
}

/// Routes under `/platinum/campaigns`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/platinum/campaigns")
            // Before /{id} so "scripts" is never taken for a campaign id
            .service(
                web::resource("/scripts")
                    .route(web::post().to(create_script))
                    .route(web::get().to(list_scripts)),
            )
            .route("/scripts/{id}", web::get().to(get_script))
            .service(
                web::resource(["", "/"])
                    .route(web::post().to(create_campaign))
                    .route(web::get().to(list_campaigns)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_campaign))
                    .route(web::patch().to(update_campaign)),
            )
            .route("/{id}/start", web::post().to(start_campaign))
            .route("/{id}/pause", web::post().to(pause_campaign))
            .route("/{id}/stop", web::post().to(stop_campaign))
            .route("/{id}/calls", web::get().to(list_campaign_calls)),
    );
}
