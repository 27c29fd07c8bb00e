//! Chatbot service
//!
//! Replies come from the LLM with the stored session history as context.
//! The chat endpoint never fails: a missing key or an LLM error turns into a
//! canned reply, and persistence errors are only logged.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use velora_core::{
    models::{ChatMessage, ChatRole},
    traits::ChatMessageRepository,
    AppResult,
};
use velora_integrations::{IntegrationError, LlmClient, LlmMessage};

use crate::constants::{CHAT_HISTORY_LIMIT, FALLBACK_REPLY, NOT_CONFIGURED_REPLY};

/// Text generation backend
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn reply(&self, messages: &[LlmMessage]) -> Result<String, IntegrationError>;
}

#[async_trait]
impl ChatModel for LlmClient {
    fn is_configured(&self) -> bool {
        LlmClient::is_configured(self)
    }

    async fn reply(&self, messages: &[LlmMessage]) -> Result<String, IntegrationError> {
        self.complete(messages).await
    }
}

/// Answer to one chat message
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
}

pub struct ChatService<R: ChatMessageRepository, M: ChatModel> {
    messages: Arc<R>,
    model: Arc<M>,
    system_prompt: String,
    history_window: i64,
}

impl<R: ChatMessageRepository, M: ChatModel> ChatService<R, M> {
    pub fn new(messages: Arc<R>, model: Arc<M>, system_prompt: String, history_window: i64) -> Self {
        Self {
            messages,
            model,
            system_prompt,
            history_window,
        }
    }

    /// Reply to `message`, opening a new session when none is given
    #[instrument(skip(self, message))]
    pub async fn chat(&self, message: &str, session_id: Option<String>) -> ChatReply {
        let session_id = session_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if !self.model.is_configured() {
            warn!("Chat model not configured, sending canned reply");
            return ChatReply {
                response: NOT_CONFIGURED_REPLY.to_string(),
                session_id,
            };
        }

        let history = self
            .messages
            .history(&session_id, self.history_window)
            .await
            .unwrap_or_else(|e| {
                warn!("Could not load chat history for {}: {}", session_id, e);
                Vec::new()
            });

        let mut prompt = Vec::with_capacity(history.len() + 2);
        prompt.push(LlmMessage::system(self.system_prompt.as_str()));
        prompt.extend(
            history
                .into_iter()
                .map(|m| LlmMessage::new(m.role.to_string(), m.content)),
        );
        prompt.push(LlmMessage::user(message));

        let response = match self.model.reply(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                error!("LLM error: {}", e);
                return ChatReply {
                    response: FALLBACK_REPLY.to_string(),
                    session_id,
                };
            }
        };

        for stored in [
            ChatMessage::new(session_id.as_str(), ChatRole::User, message),
            ChatMessage::new(session_id.as_str(), ChatRole::Assistant, response.as_str()),
        ] {
            if let Err(e) = self.messages.append(&stored).await {
                error!("Failed to store chat message: {}", e);
            }
        }

        info!("Chat reply sent for session {}", session_id);
        ChatReply {
            response,
            session_id,
        }
    }

    /// Start of a conversation, up to [`CHAT_HISTORY_LIMIT`] messages
    pub async fn history(&self, session_id: &str) -> AppResult<Vec<ChatMessage>> {
        self.messages.transcript(session_id, CHAT_HISTORY_LIMIT).await
    }

    pub async fn clear(&self, session_id: &str) -> AppResult<u64> {
        let deleted = self.messages.delete_session(session_id).await?;
        info!("Cleared {} chat messages of session {}", deleted, session_id);
        Ok(deleted)
    }
}
