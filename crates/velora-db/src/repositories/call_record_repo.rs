//! Call record repository implementation
//!
//! Stored CDRs of the CRM. Inserting a record also adds its usage to the
//! owning customer's counters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;
use velora_core::{
    models::{CallRecord, Customer},
    AppError, AppResult,
};

const CALL_RECORD_SELECT_COLUMNS: &str = r#"
    id, customer_id, caller_number, called_number, country, city,
    duration, call_date, cost, ai_spam_score, ai_sentiment,
    ai_noise_filtered, ai_transcription, audio_url, codec
"#;

/// Database row representation of a call record
#[derive(Debug, FromRow)]
struct CallRecordRow {
    id: Uuid,
    customer_id: Uuid,
    caller_number: String,
    called_number: String,
    country: String,
    city: Option<String>,
    duration: i32,
    call_date: DateTime<Utc>,
    cost: Decimal,
    ai_spam_score: Option<f64>,
    ai_sentiment: Option<String>,
    ai_noise_filtered: bool,
    ai_transcription: Option<String>,
    audio_url: Option<String>,
    codec: Option<String>,
}

impl From<CallRecordRow> for CallRecord {
    fn from(row: CallRecordRow) -> Self {
        CallRecord {
            id: row.id,
            customer_id: row.customer_id,
            caller_number: row.caller_number,
            called_number: row.called_number,
            country: row.country,
            city: row.city,
            duration: row.duration,
            call_date: row.call_date,
            cost: row.cost,
            ai_spam_score: row.ai_spam_score,
            ai_sentiment: row.ai_sentiment,
            ai_noise_filtered: row.ai_noise_filtered,
            ai_transcription: row.ai_transcription,
            audio_url: row.audio_url,
            codec: row.codec,
        }
    }
}

/// PostgreSQL implementation of the call record repository
pub struct PgCallRecordRepository {
    pool: PgPool,
}

impl PgCallRecordRepository {
    /// Create a new call record repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a record and add its minutes and one call to the customer
    #[instrument(skip(self, record), fields(record_id = %record.id, customer_id = %record.customer_id))]
    pub async fn create(&self, record: &CallRecord) -> AppResult<CallRecord> {
        debug!(
            "Storing call record {} -> {} ({}s)",
            record.caller_number, record.called_number, record.duration
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Database(format!("Failed to begin transaction: {}", e))
        })?;

        let query = format!(
            r#"
            INSERT INTO call_records (
                id, customer_id, caller_number, called_number, country, city,
                duration, call_date, cost, ai_spam_score, ai_sentiment,
                ai_noise_filtered, ai_transcription, audio_url, codec
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            CALL_RECORD_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CallRecordRow>(&query)
            .bind(record.id)
            .bind(record.customer_id)
            .bind(&record.caller_number)
            .bind(&record.called_number)
            .bind(&record.country)
            .bind(&record.city)
            .bind(record.duration)
            .bind(record.call_date)
            .bind(record.cost)
            .bind(record.ai_spam_score)
            .bind(&record.ai_sentiment)
            .bind(record.ai_noise_filtered)
            .bind(&record.ai_transcription)
            .bind(&record.audio_url)
            .bind(&record.codec)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error creating call record: {}", e);
                AppError::Database(format!("Failed to create call record: {}", e))
            })?;

        let updated = sqlx::query(
            r#"
            UPDATE customers
            SET total_minutes = total_minutes + $2,
                total_calls = total_calls + 1
            WHERE id = $1
            "#,
        )
        .bind(record.customer_id)
        .bind(Customer::minutes_for(record.duration))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error updating customer usage: {}", e);
            AppError::Database(format!("Failed to update customer usage: {}", e))
        })?;

        if updated.rows_affected() == 0 {
            warn!("Call record {} references unknown customer {}", record.id, record.customer_id);
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit call record: {}", e);
            AppError::Database(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(row.into())
    }

    /// Newest records first, optionally for a single customer
    #[instrument(skip(self))]
    pub async fn list(&self, customer_id: Option<Uuid>, limit: i64) -> AppResult<Vec<CallRecord>> {
        debug!("Listing call records for customer: {:?}", customer_id);

        let query = format!(
            r#"
            SELECT {} FROM call_records
            WHERE ($1::uuid IS NULL OR customer_id = $1)
            ORDER BY call_date DESC
            LIMIT $2
            "#,
            CALL_RECORD_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, CallRecordRow>(&query)
            .bind(customer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing call records: {}", e);
                AppError::Database(format!("Failed to list call records: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
