//! Dealer repository implementation
//!
//! Provides PostgreSQL-backed storage for reseller dealers.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use velora_core::{models::Dealer, AppError, AppResult};

const DEALER_SELECT_COLUMNS: &str = r#"
    id, name, email, phone, status, created_at,
    total_customers, total_minutes, total_calls
"#;

/// Maximum rows returned by a dealer listing
pub const DEALER_LIST_LIMIT: i64 = 100;

/// Database row representation of a dealer
#[derive(Debug, FromRow)]
struct DealerRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    status: String,
    created_at: DateTime<Utc>,
    total_customers: i32,
    total_minutes: f64,
    total_calls: i32,
}

impl From<DealerRow> for Dealer {
    fn from(row: DealerRow) -> Self {
        Dealer {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            status: row.status,
            created_at: row.created_at,
            total_customers: row.total_customers,
            total_minutes: row.total_minutes,
            total_calls: row.total_calls,
        }
    }
}

/// PostgreSQL implementation of Dealer repository
pub struct PgDealerRepository {
    pool: PgPool,
}

impl PgDealerRepository {
    /// Create a new dealer repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find dealer by ID
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Dealer>> {
        debug!("Finding dealer by id: {}", id);

        let query = format!("SELECT {} FROM dealers WHERE id = $1", DEALER_SELECT_COLUMNS);

        let result = sqlx::query_as::<sqlx::Postgres, DealerRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding dealer {}: {}", id, e);
                AppError::Database(format!("Failed to find dealer: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    /// List dealers, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<Dealer>> {
        debug!("Listing dealers");

        let query = format!(
            "SELECT {} FROM dealers ORDER BY created_at LIMIT $1",
            DEALER_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, DealerRow>(&query)
            .bind(DEALER_LIST_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing dealers: {}", e);
                AppError::Database(format!("Failed to list dealers: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a new dealer
    #[instrument(skip(self, dealer), fields(dealer_id = %dealer.id))]
    pub async fn create(&self, dealer: &Dealer) -> AppResult<Dealer> {
        debug!("Creating dealer: {}", dealer.name);

        let query = format!(
            r#"
            INSERT INTO dealers (
                id, name, email, phone, status, created_at,
                total_customers, total_minutes, total_calls
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            DEALER_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, DealerRow>(&query)
            .bind(dealer.id)
            .bind(&dealer.name)
            .bind(&dealer.email)
            .bind(&dealer.phone)
            .bind(&dealer.status)
            .bind(dealer.created_at)
            .bind(dealer.total_customers)
            .bind(dealer.total_minutes)
            .bind(dealer.total_calls)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating dealer: {}", e);
                if e.to_string().contains("unique constraint") {
                    AppError::AlreadyExists(format!("Dealer {} already exists", dealer.id))
                } else {
                    AppError::Database(format!("Failed to create dealer: {}", e))
                }
            })?;

        Ok(row.into())
    }
}
