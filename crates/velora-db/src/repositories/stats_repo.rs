//! Dashboard statistics queries

use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use velora_core::{models::CrmStatistics, AppError, AppResult};

#[derive(Debug, FromRow)]
struct StatisticsRow {
    total_dealers: i64,
    total_customers: i64,
    total_users: i64,
    active_calls: i64,
    total_duration: i64,
    total_calls: i64,
}

/// Aggregate counters over the CRM tables
pub struct PgStatisticsRepository {
    pool: PgPool,
}

impl PgStatisticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn crm_statistics(&self) -> AppResult<CrmStatistics> {
        debug!("Computing CRM statistics");

        let row = sqlx::query_as::<sqlx::Postgres, StatisticsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM dealers) AS total_dealers,
                (SELECT COUNT(*) FROM customers) AS total_customers,
                (SELECT COUNT(*) FROM crm_users) AS total_users,
                (SELECT COUNT(*) FROM active_calls WHERE status = 'active') AS active_calls,
                (SELECT COALESCE(SUM(duration), 0)::BIGINT FROM call_records) AS total_duration,
                (SELECT COUNT(*) FROM call_records) AS total_calls
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error computing statistics: {}", e);
            AppError::Database(format!("Failed to compute statistics: {}", e))
        })?;

        Ok(CrmStatistics {
            total_dealers: row.total_dealers,
            total_customers: row.total_customers,
            total_users: row.total_users,
            active_calls: row.active_calls,
            ..Default::default()
        }
        .with_call_totals(row.total_duration, row.total_calls))
    }
}
