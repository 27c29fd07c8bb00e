//! Campaign call log repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;
use velora_core::{
    models::{CallLog, CallStatus, CampaignStats},
    traits::CallLogRepository,
    AppError, AppResult,
};

const CALL_LOG_SELECT_COLUMNS: &str = r#"
    id, campaign_id, number, status, started_at, answered_at,
    ended_at, duration, hangup_cause, dtmf, audio_id,
    retry_count, created_at
"#;

#[derive(Debug, FromRow)]
struct CallLogRow {
    id: Uuid,
    campaign_id: Uuid,
    number: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    answered_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    duration: Option<i32>,
    hangup_cause: Option<String>,
    dtmf: Option<String>,
    audio_id: Option<String>,
    retry_count: i32,
    created_at: DateTime<Utc>,
}

impl From<CallLogRow> for CallLog {
    fn from(row: CallLogRow) -> Self {
        CallLog {
            id: row.id,
            campaign_id: row.campaign_id,
            number: row.number,
            status: CallStatus::from_str(&row.status).unwrap_or_default(),
            started_at: row.started_at,
            answered_at: row.answered_at,
            ended_at: row.ended_at,
            duration: row.duration,
            hangup_cause: row.hangup_cause,
            dtmf: row.dtmf,
            audio_id: row.audio_id,
            retry_count: row.retry_count,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StatusCountRow {
    status: String,
    count: i64,
}

/// Insert call log entries on an open connection; returns the number inserted
pub(crate) async fn insert_call_logs(conn: &mut PgConnection, logs: &[CallLog]) -> AppResult<u64> {
    debug!("Inserting {} call logs", logs.len());

    let mut inserted = 0;

    for log in logs {
        sqlx::query(
            r#"
            INSERT INTO campaign_call_logs (
                id, campaign_id, number, status, started_at, answered_at,
                ended_at, duration, hangup_cause, dtmf, audio_id,
                retry_count, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(log.id)
        .bind(log.campaign_id)
        .bind(&log.number)
        .bind(log.status.to_string())
        .bind(log.started_at)
        .bind(log.answered_at)
        .bind(log.ended_at)
        .bind(log.duration)
        .bind(&log.hangup_cause)
        .bind(&log.dtmf)
        .bind(&log.audio_id)
        .bind(log.retry_count)
        .bind(log.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            error!("Failed to insert call log for {}: {}", log.number, e);
            AppError::Database(format!("Failed to insert call log: {}", e))
        })?;

        inserted += 1;
    }

    Ok(inserted)
}

/// Fail every pending or dialing entry of a campaign; returns the count
pub(crate) async fn cancel_open_calls(
    conn: &mut PgConnection,
    campaign_id: Uuid,
    hangup_cause: &str,
    ended_at: DateTime<Utc>,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        UPDATE campaign_call_logs
        SET status = 'failed', hangup_cause = $2, ended_at = $3
        WHERE campaign_id = $1 AND status IN ('pending', 'dialing')
        "#,
    )
    .bind(campaign_id)
    .bind(hangup_cause)
    .bind(ended_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        error!("Database error cancelling call logs for {}: {}", campaign_id, e);
        AppError::Database(format!("Failed to cancel call logs: {}", e))
    })?;

    Ok(result.rows_affected())
}

/// Counters recomputed from the stored entries of a campaign
pub(crate) async fn count_by_status(
    conn: &mut PgConnection,
    campaign_id: Uuid,
) -> AppResult<CampaignStats> {
    let rows = sqlx::query_as::<sqlx::Postgres, StatusCountRow>(
        r#"
        SELECT status, COUNT(*) AS count
        FROM campaign_call_logs
        WHERE campaign_id = $1
        GROUP BY status
        "#,
    )
    .bind(campaign_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| {
        error!("Database error counting call logs for {}: {}", campaign_id, e);
        AppError::Database(format!("Failed to count call logs: {}", e))
    })?;

    let mut stats = CampaignStats::default();
    for row in rows {
        stats.total += row.count;
        match CallStatus::from_str(&row.status) {
            Some(CallStatus::Pending) => stats.pending += row.count,
            Some(CallStatus::Dialing) => stats.dialing += row.count,
            Some(CallStatus::Answered) => stats.answered += row.count,
            Some(CallStatus::Busy) => stats.busy += row.count,
            Some(CallStatus::Noanswer) => stats.noanswer += row.count,
            Some(CallStatus::Failed) => stats.failed += row.count,
            Some(CallStatus::Completed) => stats.completed += row.count,
            None => warn!("Unknown call log status '{}'", row.status),
        }
    }

    Ok(stats)
}

/// PostgreSQL implementation of CallLogRepository
pub struct PgCallLogRepository {
    pool: PgPool,
}

impl PgCallLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CallLogRepository for PgCallLogRepository {
    #[instrument(skip(self))]
    async fn list_by_campaign(
        &self,
        campaign_id: Uuid,
        status: Option<CallStatus>,
        limit: i64,
        skip: i64,
    ) -> AppResult<Vec<CallLog>> {
        let query = format!(
            r#"
            SELECT {} FROM campaign_call_logs
            WHERE campaign_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
            CALL_LOG_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, CallLogRow>(&query)
            .bind(campaign_id)
            .bind(status.map(|s| s.to_string()))
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing call logs for {}: {}", campaign_id, e);
                AppError::Database(format!("Failed to list call logs: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
