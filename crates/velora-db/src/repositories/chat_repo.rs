//! Chat message repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use velora_core::{
    models::{ChatMessage, ChatRole},
    traits::ChatMessageRepository,
    AppError, AppResult,
};

#[derive(Debug, FromRow)]
struct ChatMessageRow {
    session_id: String,
    role: String,
    content: String,
    timestamp: DateTime<Utc>,
}

impl From<ChatMessageRow> for ChatMessage {
    fn from(row: ChatMessageRow) -> Self {
        ChatMessage {
            session_id: row.session_id,
            role: ChatRole::from_str(&row.role).unwrap_or(ChatRole::User),
            content: row.content,
            timestamp: row.timestamp,
        }
    }
}

/// PostgreSQL implementation of ChatMessageRepository
pub struct PgChatMessageRepository {
    pool: PgPool,
}

impl PgChatMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatMessageRepository for PgChatMessageRepository {
    #[instrument(skip(self, message), fields(session_id = %message.session_id, role = %message.role))]
    async fn append(&self, message: &ChatMessage) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO chat_messages (session_id, role, content, timestamp) VALUES ($1, $2, $3, $4)",
        )
        .bind(&message.session_id)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(message.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error storing chat message: {}", e);
            AppError::Database(format!("Failed to store chat message: {}", e))
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn history(&self, session_id: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        debug!("Loading chat history for session {}", session_id);

        let rows = sqlx::query_as::<sqlx::Postgres, ChatMessageRow>(
            r#"
            SELECT session_id, role, content, timestamp FROM (
                SELECT id, session_id, role, content, timestamp
                FROM chat_messages
                WHERE session_id = $1
                ORDER BY timestamp DESC, id DESC
                LIMIT $2
            ) recent
            ORDER BY timestamp, id
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading chat history: {}", e);
            AppError::Database(format!("Failed to load chat history: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn transcript(&self, session_id: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<sqlx::Postgres, ChatMessageRow>(
            r#"
            SELECT session_id, role, content, timestamp
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY timestamp, id
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading chat transcript: {}", e);
            AppError::Database(format!("Failed to load chat history: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting chat session: {}", e);
                AppError::Database(format!("Failed to delete chat history: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}
