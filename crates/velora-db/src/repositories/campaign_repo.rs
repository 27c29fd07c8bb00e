//! Campaign repository implementation
//!
//! Number lists are stored as `TEXT[]`; stats and schedule as JSONB.
//! Writes that touch `campaign_call_logs` as well run in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use velora_core::{
    models::{CallLog, Campaign, CampaignStats, CampaignStatus},
    traits::CampaignRepository,
    AppError, AppResult,
};

use super::call_log_repo::{cancel_open_calls, count_by_status, insert_call_logs};

const CAMPAIGN_SELECT_COLUMNS: &str = r#"
    id, name, script_id, trunk, context, concurrency, numbers,
    schedule, status, created_at, updated_at, started_at,
    completed_at, stats
"#;

/// Database row representation of a campaign
#[derive(Debug, FromRow)]
struct CampaignRow {
    id: Uuid,
    name: String,
    script_id: Uuid,
    trunk: String,
    context: String,
    concurrency: i32,
    numbers: Vec<String>,
    schedule: Option<serde_json::Value>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    stats: Json<CampaignStats>,
}

impl From<CampaignRow> for Campaign {
    fn from(row: CampaignRow) -> Self {
        let status = CampaignStatus::from_str(&row.status).unwrap_or_else(|| {
            warn!("Unknown campaign status '{}' on {}", row.status, row.id);
            CampaignStatus::Draft
        });

        Campaign {
            id: row.id,
            name: row.name,
            script_id: row.script_id,
            trunk: row.trunk,
            context: row.context,
            concurrency: row.concurrency,
            numbers: row.numbers,
            schedule: row.schedule,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            started_at: row.started_at,
            completed_at: row.completed_at,
            stats: row.stats.0,
        }
    }
}

/// PostgreSQL implementation of CampaignRepository
pub struct PgCampaignRepository {
    pool: PgPool,
}

impl PgCampaignRepository {
    /// Create a new campaign repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Campaign>> {
        debug!("Finding campaign by id: {}", id);

        let query = format!("SELECT {} FROM campaigns WHERE id = $1", CAMPAIGN_SELECT_COLUMNS);

        let result = sqlx::query_as::<sqlx::Postgres, CampaignRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding campaign {}: {}", id, e);
                AppError::Database(format!("Failed to find campaign: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        status: Option<CampaignStatus>,
        limit: i64,
        skip: i64,
    ) -> AppResult<Vec<Campaign>> {
        debug!("Listing campaigns with status {:?}", status);

        let query = format!(
            r#"
            SELECT {} FROM campaigns
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            CAMPAIGN_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, CampaignRow>(&query)
            .bind(status.map(|s| s.to_string()))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing campaigns: {}", e);
                AppError::Database(format!("Failed to list campaigns: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, campaign, calls), fields(campaign_id = %campaign.id, calls = calls.len()))]
    async fn create(&self, campaign: &Campaign, calls: &[CallLog]) -> AppResult<Campaign> {
        debug!("Creating campaign: {}", campaign.name);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Database(format!("Failed to begin transaction: {}", e))
        })?;

        let query = format!(
            r#"
            INSERT INTO campaigns (
                id, name, script_id, trunk, context, concurrency, numbers,
                schedule, status, created_at, updated_at, started_at,
                completed_at, stats
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            CAMPAIGN_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CampaignRow>(&query)
            .bind(campaign.id)
            .bind(&campaign.name)
            .bind(campaign.script_id)
            .bind(&campaign.trunk)
            .bind(&campaign.context)
            .bind(campaign.concurrency)
            .bind(&campaign.numbers)
            .bind(&campaign.schedule)
            .bind(campaign.status.to_string())
            .bind(campaign.created_at)
            .bind(campaign.updated_at)
            .bind(campaign.started_at)
            .bind(campaign.completed_at)
            .bind(Json(&campaign.stats))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error creating campaign: {}", e);
                AppError::Database(format!("Failed to create campaign: {}", e))
            })?;

        insert_call_logs(&mut tx, calls).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit campaign creation: {}", e);
            AppError::Database(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, campaign), fields(campaign_id = %campaign.id))]
    async fn update(&self, campaign: &Campaign) -> AppResult<Campaign> {
        debug!("Updating campaign: {}", campaign.id);

        let query = format!(
            r#"
            UPDATE campaigns SET
                name = $2, concurrency = $3, schedule = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CAMPAIGN_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CampaignRow>(&query)
            .bind(campaign.id)
            .bind(&campaign.name)
            .bind(campaign.concurrency)
            .bind(&campaign.schedule)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating campaign {}: {}", campaign.id, e);
                AppError::Database(format!("Failed to update campaign: {}", e))
            })?
            .ok_or_else(|| AppError::CampaignNotFound(campaign.id.to_string()))?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        debug!("Setting campaign {} status to {}", id, status);

        let result = sqlx::query(
            r#"
            UPDATE campaigns SET
                status = $2,
                started_at = COALESCE($3, started_at),
                completed_at = COALESCE($4, completed_at),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .bind(started_at)
        .bind(completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating campaign status {}: {}", id, e);
            AppError::Database(format!("Failed to update campaign status: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::CampaignNotFound(id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn hard_stop(
        &self,
        id: Uuid,
        hangup_cause: &str,
        completed_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Database(format!("Failed to begin transaction: {}", e))
        })?;

        let cancelled = cancel_open_calls(&mut tx, id, hangup_cause, completed_at).await?;
        let stats = count_by_status(&mut tx, id).await?;

        let result = sqlx::query(
            r#"
            UPDATE campaigns SET
                status = $2,
                stats = $3,
                completed_at = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(CampaignStatus::Stopped.to_string())
        .bind(Json(&stats))
        .bind(completed_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error stopping campaign {}: {}", id, e);
            AppError::Database(format!("Failed to stop campaign: {}", e))
        })?;

        // Dropping the transaction rolls the cancelled call logs back
        if result.rows_affected() == 0 {
            return Err(AppError::CampaignNotFound(id.to_string()));
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit hard stop of {}: {}", id, e);
            AppError::Database(format!("Failed to commit transaction: {}", e))
        })?;

        info!("Campaign {} hard-stopped, {} call logs cancelled", id, cancelled);
        Ok(cancelled)
    }
}
