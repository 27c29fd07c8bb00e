//! Active call repository implementation

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use velora_core::{
    models::{ActiveCall, ActiveCallStatus},
    AppError, AppResult,
};

const ACTIVE_CALL_SELECT_COLUMNS: &str = r#"
    id, customer_id, caller, callee, trunk, duration,
    codec, country, city, status, started_at
"#;

pub const ACTIVE_CALL_LIST_LIMIT: i64 = 100;

#[derive(Debug, FromRow)]
struct ActiveCallRow {
    id: Uuid,
    customer_id: Uuid,
    caller: String,
    callee: String,
    trunk: String,
    duration: i32,
    codec: String,
    country: String,
    city: Option<String>,
    status: String,
    started_at: DateTime<Utc>,
}

impl From<ActiveCallRow> for ActiveCall {
    fn from(row: ActiveCallRow) -> Self {
        ActiveCall {
            id: row.id,
            customer_id: row.customer_id,
            caller: row.caller,
            callee: row.callee,
            trunk: row.trunk,
            duration: row.duration,
            codec: row.codec,
            country: row.country,
            city: row.city,
            status: ActiveCallStatus::from_str(&row.status).unwrap_or_default(),
            started_at: row.started_at,
        }
    }
}

/// PostgreSQL implementation of the active call repository
pub struct PgActiveCallRepository {
    pool: PgPool,
}

impl PgActiveCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, call), fields(call_id = %call.id))]
    pub async fn create(&self, call: &ActiveCall) -> AppResult<ActiveCall> {
        debug!("Registering active call {} -> {}", call.caller, call.callee);

        let query = format!(
            r#"
            INSERT INTO active_calls (
                id, customer_id, caller, callee, trunk, duration,
                codec, country, city, status, started_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            ACTIVE_CALL_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, ActiveCallRow>(&query)
            .bind(call.id)
            .bind(call.customer_id)
            .bind(&call.caller)
            .bind(&call.callee)
            .bind(&call.trunk)
            .bind(call.duration)
            .bind(&call.codec)
            .bind(&call.country)
            .bind(&call.city)
            .bind(call.status.to_string())
            .bind(call.started_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating active call: {}", e);
                AppError::Database(format!("Failed to create active call: {}", e))
            })?;

        Ok(row.into())
    }

    /// Calls still in `active` state
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> AppResult<Vec<ActiveCall>> {
        let query = format!(
            r#"
            SELECT {} FROM active_calls
            WHERE status = 'active'
            ORDER BY started_at DESC
            LIMIT $1
            "#,
            ACTIVE_CALL_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ActiveCallRow>(&query)
            .bind(ACTIVE_CALL_LIST_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing active calls: {}", e);
                AppError::Database(format!("Failed to list active calls: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark a call terminated; returns whether a row matched
    #[instrument(skip(self))]
    pub async fn terminate(&self, id: Uuid) -> AppResult<bool> {
        debug!("Terminating call: {}", id);

        let result = sqlx::query("UPDATE active_calls SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(ActiveCallStatus::Terminated.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error terminating call {}: {}", id, e);
                AppError::Database(format!("Failed to terminate call: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}
