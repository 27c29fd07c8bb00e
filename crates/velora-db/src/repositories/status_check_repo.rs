//! Status check repository implementation

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, instrument};
use uuid::Uuid;
use velora_core::{models::StatusCheck, AppError, AppResult};

pub const STATUS_CHECK_LIST_LIMIT: i64 = 1000;

#[derive(Debug, FromRow)]
struct StatusCheckRow {
    id: Uuid,
    client_name: String,
    timestamp: DateTime<Utc>,
}

impl From<StatusCheckRow> for StatusCheck {
    fn from(row: StatusCheckRow) -> Self {
        StatusCheck {
            id: row.id,
            client_name: row.client_name,
            timestamp: row.timestamp,
        }
    }
}

pub struct PgStatusCheckRepository {
    pool: PgPool,
}

impl PgStatusCheckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, check), fields(client = %check.client_name))]
    pub async fn create(&self, check: &StatusCheck) -> AppResult<StatusCheck> {
        let row = sqlx::query_as::<sqlx::Postgres, StatusCheckRow>(
            r#"
            INSERT INTO status_checks (id, client_name, timestamp)
            VALUES ($1, $2, $3)
            RETURNING id, client_name, timestamp
            "#,
        )
        .bind(check.id)
        .bind(&check.client_name)
        .bind(check.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating status check: {}", e);
            AppError::Database(format!("Failed to create status check: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<StatusCheck>> {
        let rows = sqlx::query_as::<sqlx::Postgres, StatusCheckRow>(
            "SELECT id, client_name, timestamp FROM status_checks ORDER BY timestamp LIMIT $1",
        )
        .bind(STATUS_CHECK_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing status checks: {}", e);
            AppError::Database(format!("Failed to list status checks: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
