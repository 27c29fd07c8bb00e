//! PostgreSQL pool and schema set-up

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};
use velora_core::{config::DatabaseConfig, AppError, AppResult};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Open the pool described by `config` and check that the server answers
///
/// ```no_run
/// use velora_core::config::DatabaseConfig;
/// use velora_db::create_pool;
///
/// # async fn run() -> velora_core::AppResult<()> {
/// let config = DatabaseConfig {
///     url: "postgresql://localhost/velora".to_string(),
///     max_connections: 5,
///     run_migrations: true,
/// };
/// let pool = create_pool(&config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    info!(
        max_connections = config.max_connections,
        "Opening PostgreSQL pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(Some(IDLE_TIMEOUT))
        .test_before_acquire(true)
        .connect(&config.url)
        .await
        .map_err(|e| {
            error!("Cannot reach PostgreSQL: {}", e);
            AppError::Pool(format!("Failed to connect to database: {}", e))
        })?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Database ping failed: {}", e)))?;

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok(pool)
}

/// Apply pending migrations from `crates/velora-db/migrations`
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        error!("Migration failed: {}", e);
        AppError::from(e)
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Migrated pool for the database-backed tests
#[cfg(test)]
pub(crate) async fn test_pool() -> PgPool {
    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/velora".to_string()),
        max_connections: 2,
        run_migrations: true,
    };
    create_pool(&config).await.unwrap()
}
