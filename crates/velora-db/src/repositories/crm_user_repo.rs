//! CRM user repository implementation

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use velora_core::{models::CrmUser, AppError, AppResult};

const CRM_USER_SELECT_COLUMNS: &str = r#"
    id, customer_id, username, extension, status,
    total_minutes, total_calls, created_at
"#;

pub const CRM_USER_LIST_LIMIT: i64 = 1000;

#[derive(Debug, FromRow)]
struct CrmUserRow {
    id: Uuid,
    customer_id: Uuid,
    username: String,
    extension: Option<String>,
    status: String,
    total_minutes: f64,
    total_calls: i32,
    created_at: DateTime<Utc>,
}

impl From<CrmUserRow> for CrmUser {
    fn from(row: CrmUserRow) -> Self {
        CrmUser {
            id: row.id,
            customer_id: row.customer_id,
            username: row.username,
            extension: row.extension,
            status: row.status,
            total_minutes: row.total_minutes,
            total_calls: row.total_calls,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL implementation of the CRM user repository
pub struct PgCrmUserRepository {
    pool: PgPool,
}

impl PgCrmUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List users, optionally restricted to one customer
    #[instrument(skip(self))]
    pub async fn list(&self, customer_id: Option<Uuid>) -> AppResult<Vec<CrmUser>> {
        debug!("Listing CRM users for customer: {:?}", customer_id);

        let query = format!(
            r#"
            SELECT {} FROM crm_users
            WHERE ($1::uuid IS NULL OR customer_id = $1)
            ORDER BY created_at
            LIMIT $2
            "#,
            CRM_USER_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, CrmUserRow>(&query)
            .bind(customer_id)
            .bind(CRM_USER_LIST_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing CRM users: {}", e);
                AppError::Database(format!("Failed to list users: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn create(&self, user: &CrmUser) -> AppResult<CrmUser> {
        debug!("Creating CRM user: {}", user.username);

        let query = format!(
            r#"
            INSERT INTO crm_users (
                id, customer_id, username, extension, status,
                total_minutes, total_calls, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CRM_USER_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CrmUserRow>(&query)
            .bind(user.id)
            .bind(user.customer_id)
            .bind(&user.username)
            .bind(&user.extension)
            .bind(&user.status)
            .bind(user.total_minutes)
            .bind(user.total_calls)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating CRM user: {}", e);
                AppError::Database(format!("Failed to create user: {}", e))
            })?;

        Ok(row.into())
    }
}
