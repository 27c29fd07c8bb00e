//! Campaign script repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;
use velora_core::{models::Script, traits::ScriptRepository, AppError, AppResult};

const SCRIPT_SELECT_COLUMNS: &str = r#"
    id, name, language, text, variables, voice_id, audio_id,
    created_at, updated_at
"#;

#[derive(Debug, FromRow)]
struct ScriptRow {
    id: Uuid,
    name: String,
    language: String,
    text: String,
    variables: Vec<String>,
    voice_id: Option<String>,
    audio_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ScriptRow> for Script {
    fn from(row: ScriptRow) -> Self {
        Script {
            id: row.id,
            name: row.name,
            language: row.language,
            text: row.text,
            variables: row.variables,
            voice_id: row.voice_id,
            audio_id: row.audio_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of ScriptRepository
pub struct PgScriptRepository {
    pool: PgPool,
}

impl PgScriptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScriptRepository for PgScriptRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Script>> {
        debug!("Finding script by id: {}", id);

        let query = format!(
            "SELECT {} FROM campaign_scripts WHERE id = $1",
            SCRIPT_SELECT_COLUMNS
        );

        let result = sqlx::query_as::<sqlx::Postgres, ScriptRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding script {}: {}", id, e);
                AppError::Database(format!("Failed to find script: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: i64, skip: i64) -> AppResult<Vec<Script>> {
        let query = format!(
            "SELECT {} FROM campaign_scripts ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            SCRIPT_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ScriptRow>(&query)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing scripts: {}", e);
                AppError::Database(format!("Failed to list scripts: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, script), fields(script_id = %script.id))]
    async fn create(&self, script: &Script) -> AppResult<Script> {
        debug!("Creating script: {}", script.name);

        let query = format!(
            r#"
            INSERT INTO campaign_scripts (
                id, name, language, text, variables, voice_id, audio_id,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            SCRIPT_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, ScriptRow>(&query)
            .bind(script.id)
            .bind(&script.name)
            .bind(&script.language)
            .bind(&script.text)
            .bind(&script.variables)
            .bind(&script.voice_id)
            .bind(&script.audio_id)
            .bind(script.created_at)
            .bind(script.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating script: {}", e);
                AppError::Database(format!("Failed to create script: {}", e))
            })?;

        Ok(row.into())
    }
}
