//! Repository traits
//!
//! Abstractions over the campaign and chatbot stores. `velora-db` provides
//! the PostgreSQL implementations; services depend only on these traits.

use crate::error::AppError;
use crate::models::{CallLog, CallStatus, Campaign, CampaignStatus, ChatMessage, Script};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// TTS script store
#[async_trait]
pub trait ScriptRepository: Send + Sync {
    /// Find script by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Script>, AppError>;

    /// Newest first
    async fn list(&self, limit: i64, skip: i64) -> Result<Vec<Script>, AppError>;

    async fn create(&self, script: &Script) -> Result<Script, AppError>;
}

/// Campaign store
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, AppError>;

    /// Newest first, optionally filtered by status
    async fn list(
        &self,
        status: Option<CampaignStatus>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<Campaign>, AppError>;

    /// Insert a campaign together with its call log entries
    ///
    /// Either every row is stored or none is.
    async fn create(&self, campaign: &Campaign, calls: &[CallLog]) -> Result<Campaign, AppError>;

    /// Persist name, concurrency and schedule edits
    async fn update(&self, campaign: &Campaign) -> Result<Campaign, AppError>;

    /// Move a campaign to `status`, setting the given timestamps when present
    async fn set_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError>;

    /// Fail every open call log of a campaign, store the recomputed stats
    /// and mark the campaign stopped, all in one unit; returns the number
    /// of cancelled call logs
    async fn hard_stop(
        &self,
        id: Uuid,
        hangup_cause: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<u64, AppError>;
}

/// Per-number campaign call log store
///
/// Entries are written through [`CampaignRepository`] so that they change
/// together with their campaign.
#[async_trait]
pub trait CallLogRepository: Send + Sync {
    /// Newest first, optionally filtered by status
    async fn list_by_campaign(
        &self,
        campaign_id: Uuid,
        status: Option<CallStatus>,
        limit: i64,
        skip: i64,
    ) -> Result<Vec<CallLog>, AppError>;
}

/// Chatbot conversation store
#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    async fn append(&self, message: &ChatMessage) -> Result<(), AppError>;

    /// Most recent `limit` messages of a session, oldest first
    async fn history(&self, session_id: &str, limit: i64) -> Result<Vec<ChatMessage>, AppError>;

    /// First `limit` messages of a session, oldest first
    async fn transcript(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, AppError>;

    /// Remove a session; returns the number of deleted messages
    async fn delete_session(&self, session_id: &str) -> Result<u64, AppError>;
}
