//! Trunk settings repository implementation
//!
//! One row per customer; saving settings for a customer that already has
//! them replaces the previous row.

use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use velora_core::{models::TrunkSettings, AppError, AppResult};

const TRUNK_SELECT_COLUMNS: &str = r#"
    customer_id, ip_address, port, codec, protocol, max_calls,
    auth_username, auth_password, register_interval, nat_traversal
"#;

#[derive(Debug, FromRow)]
struct TrunkSettingsRow {
    customer_id: Uuid,
    ip_address: String,
    port: i32,
    codec: String,
    protocol: String,
    max_calls: i32,
    auth_username: Option<String>,
    auth_password: Option<String>,
    register_interval: i32,
    nat_traversal: bool,
}

impl From<TrunkSettingsRow> for TrunkSettings {
    fn from(row: TrunkSettingsRow) -> Self {
        TrunkSettings {
            customer_id: row.customer_id,
            ip_address: row.ip_address,
            port: row.port,
            codec: row.codec,
            protocol: row.protocol,
            max_calls: row.max_calls,
            auth_username: row.auth_username,
            auth_password: row.auth_password,
            register_interval: row.register_interval,
            nat_traversal: row.nat_traversal,
        }
    }
}

/// PostgreSQL implementation of the trunk settings repository
pub struct PgTrunkSettingsRepository {
    pool: PgPool,
}

impl PgTrunkSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_customer(&self, customer_id: Uuid) -> AppResult<Option<TrunkSettings>> {
        debug!("Finding trunk settings for customer: {}", customer_id);

        let query = format!(
            "SELECT {} FROM trunk_settings WHERE customer_id = $1",
            TRUNK_SELECT_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, TrunkSettingsRow>(&query)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding trunk settings {}: {}", customer_id, e);
                AppError::Database(format!("Failed to find trunk settings: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    /// Insert or replace the settings of `settings.customer_id`
    #[instrument(skip(self, settings), fields(customer_id = %settings.customer_id))]
    pub async fn upsert(&self, settings: &TrunkSettings) -> AppResult<TrunkSettings> {
        debug!("Saving trunk settings for {}", settings.endpoint());

        let query = format!(
            r#"
            INSERT INTO trunk_settings (
                customer_id, ip_address, port, codec, protocol, max_calls,
                auth_username, auth_password, register_interval, nat_traversal
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (customer_id) DO UPDATE SET
                ip_address = EXCLUDED.ip_address,
                port = EXCLUDED.port,
                codec = EXCLUDED.codec,
                protocol = EXCLUDED.protocol,
                max_calls = EXCLUDED.max_calls,
                auth_username = EXCLUDED.auth_username,
                auth_password = EXCLUDED.auth_password,
                register_interval = EXCLUDED.register_interval,
                nat_traversal = EXCLUDED.nat_traversal
            RETURNING {}
            "#,
            TRUNK_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, TrunkSettingsRow>(&query)
            .bind(settings.customer_id)
            .bind(&settings.ip_address)
            .bind(settings.port)
            .bind(&settings.codec)
            .bind(&settings.protocol)
            .bind(settings.max_calls)
            .bind(&settings.auth_username)
            .bind(&settings.auth_password)
            .bind(settings.register_interval)
            .bind(settings.nat_traversal)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error saving trunk settings: {}", e);
                AppError::Database(format!("Failed to save trunk settings: {}", e))
            })?;

        Ok(row.into())
    }
}
