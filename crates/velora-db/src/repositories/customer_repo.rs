//! Customer repository implementation
//!
//! Provides PostgreSQL-backed storage for dealer customers.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;
use velora_core::{models::Customer, AppError, AppResult};

const CUSTOMER_SELECT_COLUMNS: &str = r#"
    id, dealer_id, name, tariff, number, currency,
    total_minutes, total_calls, status, created_at
"#;

/// Maximum rows returned by a customer listing
pub const CUSTOMER_LIST_LIMIT: i64 = 1000;

/// Database row representation of a customer
#[derive(Debug, FromRow)]
struct CustomerRow {
    id: Uuid,
    dealer_id: Uuid,
    name: String,
    tariff: String,
    number: Option<String>,
    currency: String,
    total_minutes: f64,
    total_calls: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            dealer_id: row.dealer_id,
            name: row.name,
            tariff: row.tariff,
            number: row.number,
            currency: row.currency,
            total_minutes: row.total_minutes,
            total_calls: row.total_calls,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL implementation of Customer repository
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    /// Create a new customer repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find customer by ID
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        debug!("Finding customer by id: {}", id);

        let query = format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_SELECT_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, CustomerRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding customer {}: {}", id, e);
                AppError::Database(format!("Failed to find customer: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    /// List customers, optionally restricted to one dealer
    #[instrument(skip(self))]
    pub async fn list(&self, dealer_id: Option<Uuid>) -> AppResult<Vec<Customer>> {
        debug!("Listing customers for dealer: {:?}", dealer_id);

        let query = format!(
            r#"
            SELECT {} FROM customers
            WHERE ($1::uuid IS NULL OR dealer_id = $1)
            ORDER BY created_at
            LIMIT $2
            "#,
            CUSTOMER_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, CustomerRow>(&query)
            .bind(dealer_id)
            .bind(CUSTOMER_LIST_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing customers: {}", e);
                AppError::Database(format!("Failed to list customers: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a customer and bump the owning dealer's customer counter
    #[instrument(skip(self, customer), fields(customer_id = %customer.id, dealer_id = %customer.dealer_id))]
    pub async fn create(&self, customer: &Customer) -> AppResult<Customer> {
        debug!("Creating customer: {}", customer.name);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Database(format!("Failed to begin transaction: {}", e))
        })?;

        let query = format!(
            r#"
            INSERT INTO customers (
                id, dealer_id, name, tariff, number, currency,
                total_minutes, total_calls, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CUSTOMER_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, CustomerRow>(&query)
            .bind(customer.id)
            .bind(customer.dealer_id)
            .bind(&customer.name)
            .bind(&customer.tariff)
            .bind(&customer.number)
            .bind(&customer.currency)
            .bind(customer.total_minutes)
            .bind(customer.total_calls)
            .bind(&customer.status)
            .bind(customer.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error creating customer: {}", e);
                AppError::Database(format!("Failed to create customer: {}", e))
            })?;

        let updated = sqlx::query(
            "UPDATE dealers SET total_customers = total_customers + 1 WHERE id = $1",
        )
        .bind(customer.dealer_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Database error updating dealer counters: {}", e);
            AppError::Database(format!("Failed to update dealer: {}", e))
        })?;

        if updated.rows_affected() == 0 {
            warn!("Customer {} references unknown dealer {}", customer.id, customer.dealer_id);
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit customer creation: {}", e);
            AppError::Database(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(row.into())
    }

    /// Replace the editable fields of a customer
    ///
    /// Usage counters and `created_at` are kept. Returns `None` when the
    /// customer does not exist.
    #[instrument(skip(self, customer))]
    pub async fn update(&self, id: Uuid, customer: &Customer) -> AppResult<Option<Customer>> {
        debug!("Updating customer: {}", id);

        let query = format!(
            r#"
            UPDATE customers SET
                dealer_id = $2, name = $3, tariff = $4,
                number = $5, currency = $6, status = $7
            WHERE id = $1
            RETURNING {}
            "#,
            CUSTOMER_SELECT_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, CustomerRow>(&query)
            .bind(id)
            .bind(customer.dealer_id)
            .bind(&customer.name)
            .bind(&customer.tariff)
            .bind(&customer.number)
            .bind(&customer.currency)
            .bind(&customer.status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating customer {}: {}", id, e);
                AppError::Database(format!("Failed to update customer: {}", e))
            })?;

        Ok(result.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PgDealerRepository;
    use velora_core::models::Dealer;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_create_customer_bumps_dealer_counter() {
        let pool = crate::pool::test_pool().await;

        let dealers = PgDealerRepository::new(pool.clone());
        let dealer = dealers
            .create(&Dealer::new("Bayi", "bayi@test.example", "+905550000001"))
            .await
            .unwrap();

        let repo = PgCustomerRepository::new(pool);
        let customer = Customer {
            id: Uuid::new_v4(),
            dealer_id: dealer.id,
            name: "Musteri".to_string(),
            tariff: "standard".to_string(),
            number: None,
            currency: "TRY".to_string(),
            total_minutes: 0.0,
            total_calls: 0,
            status: "active".to_string(),
            created_at: Utc::now(),
        };
        repo.create(&customer).await.unwrap();

        let dealer = dealers.find_by_id(dealer.id).await.unwrap().unwrap();
        assert_eq!(dealer.total_customers, 1);

        let renamed = Customer {
            name: "Yeni Musteri".to_string(),
            ..customer.clone()
        };
        let updated = repo.update(customer.id, &renamed).await.unwrap().unwrap();
        assert_eq!(updated.name, "Yeni Musteri");
        assert!(repo.update(Uuid::new_v4(), &renamed).await.unwrap().is_none());
    }
}
