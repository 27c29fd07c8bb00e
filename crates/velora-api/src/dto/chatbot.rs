//! Chatbot DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use velora_core::models::{ChatMessage, ChatRole};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "message must not be empty"))]
    pub message: String,

    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatHistoryEntry {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatMessage> for ChatHistoryEntry {
    fn from(message: ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatHistoryResponse {
    pub session_id: String,
    pub messages: Vec<ChatHistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub deleted_count: u64,
}
