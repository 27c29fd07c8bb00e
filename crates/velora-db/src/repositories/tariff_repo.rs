//! Tariff repository implementation

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use velora_core::{models::Tariff, AppError, AppResult};

pub const TARIFF_LIST_LIMIT: i64 = 100;

#[derive(Debug, FromRow)]
struct TariffRow {
    id: Uuid,
    name: String,
    price_per_minute: Decimal,
    currency: String,
    description: Option<String>,
}

impl From<TariffRow> for Tariff {
    fn from(row: TariffRow) -> Self {
        Tariff {
            id: row.id,
            name: row.name,
            price_per_minute: row.price_per_minute,
            currency: row.currency,
            description: row.description,
        }
    }
}

pub struct PgTariffRepository {
    pool: PgPool,
}

impl PgTariffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<Tariff>> {
        let rows = sqlx::query_as::<sqlx::Postgres, TariffRow>(
            r#"
            SELECT id, name, price_per_minute, currency, description
            FROM tariffs
            ORDER BY name
            LIMIT $1
            "#,
        )
        .bind(TARIFF_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing tariffs: {}", e);
            AppError::Database(format!("Failed to list tariffs: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, tariff), fields(tariff_id = %tariff.id))]
    pub async fn create(&self, tariff: &Tariff) -> AppResult<Tariff> {
        debug!("Creating tariff: {}", tariff.name);

        let row = sqlx::query_as::<sqlx::Postgres, TariffRow>(
            r#"
            INSERT INTO tariffs (id, name, price_per_minute, currency, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, price_per_minute, currency, description
            "#,
        )
        .bind(tariff.id)
        .bind(&tariff.name)
        .bind(tariff.price_per_minute)
        .bind(&tariff.currency)
        .bind(&tariff.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating tariff: {}", e);
            AppError::Database(format!("Failed to create tariff: {}", e))
        })?;

        Ok(row.into())
    }
}
