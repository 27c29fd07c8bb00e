//! Customer and CRM user handlers

use crate::dto::{CrmUserCreateRequest, CrmUserFilterParams, CustomerFilterParams, CustomerRequest};
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;
use velora_core::AppError;
use velora_db::{PgCrmUserRepository, PgCustomerRepository};

/// POST /api/voip-crm/customers
///
/// Also increments the owning dealer's `total_customers`.
#[instrument(skip(pool, req))]
pub async fn create_customer(
    pool: web::Data<PgPool>,
    req: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Customer validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let repo = PgCustomerRepository::new(pool.get_ref().clone());
    let created = repo.create(&req.to_customer()).await?;
    info!(id = %created.id, dealer_id = %created.dealer_id, "Customer created");

    Ok(HttpResponse::Ok().json(created))
}

/// GET /api/voip-crm/customers?dealer_id=
#[instrument(skip(pool))]
pub async fn list_customers(
    pool: web::Data<PgPool>,
    query: web::Query<CustomerFilterParams>,
) -> Result<HttpResponse, AppError> {
    let repo = PgCustomerRepository::new(pool.get_ref().clone());
    Ok(HttpResponse::Ok().json(repo.list(query.dealer_id).await?))
}

/// GET /api/voip-crm/customers/{id}
#[instrument(skip(pool))]
pub async fn get_customer(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let repo = PgCustomerRepository::new(pool.get_ref().clone());
    let customer = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::CustomerNotFound(id.to_string()))?;

    Ok(HttpResponse::Ok().json(customer))
}

/// PUT /api/voip-crm/customers/{id}
///
/// Replaces the editable fields; usage counters are kept.
#[instrument(skip(pool, req))]
pub async fn update_customer(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    req: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Customer validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let id = path.into_inner();
    let repo = PgCustomerRepository::new(pool.get_ref().clone());
    let updated = repo
        .update(id, &req.to_customer())
        .await?
        .ok_or_else(|| AppError::CustomerNotFound(id.to_string()))?;
    debug!(id = %id, "Customer updated");

    Ok(HttpResponse::Ok().json(updated))
}

/// POST /api/voip-crm/users
#[instrument(skip(pool, req))]
pub async fn create_user(
    pool: web::Data<PgPool>,
    req: web::Json<CrmUserCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("User validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let repo = PgCrmUserRepository::new(pool.get_ref().clone());
    let created = repo.create(&req.to_user()).await?;
    info!(id = %created.id, username = %created.username, "CRM user created");

    Ok(HttpResponse::Ok().json(created))
}

/// GET /api/voip-crm/users?customer_id=
#[instrument(skip(pool))]
pub async fn list_users(
    pool: web::Data<PgPool>,
    query: web::Query<CrmUserFilterParams>,
) -> Result<HttpResponse, AppError> {
    let repo = PgCrmUserRepository::new(pool.get_ref().clone());
    Ok(HttpResponse::Ok().json(repo.list(query.customer_id).await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/customers")
            .route(web::post().to(create_customer))
            .route(web::get().to(list_customers)),
    )
    .service(
        web::resource("/customers/{id}")
            .route(web::get().to(get_customer))
            .route(web::put().to(update_customer)),
    )
    .service(
        web::resource("/users")
            .route(web::post().to(create_user))
            .route(web::get().to(list_users)),
    );
}
