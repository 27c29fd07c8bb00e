//! In-memory repositories and chat model for service tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;
use velora_core::{
    models::{CallLog, CallStatus, Campaign, CampaignStats, CampaignStatus, ChatMessage, Script},
    traits::{CallLogRepository, CampaignRepository, ChatMessageRepository, ScriptRepository},
    AppError, AppResult,
};
use velora_integrations::{IntegrationError, LlmMessage};

use crate::chat_service::ChatModel;

fn page<T: Clone>(items: impl Iterator<Item = T>, limit: i64, skip: i64) -> Vec<T> {
    items.skip(skip as usize).take(limit as usize).collect()
}

#[derive(Default)]
pub struct InMemoryScripts {
    scripts: Mutex<Vec<Script>>,
}

#[async_trait]
impl ScriptRepository for InMemoryScripts {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Script>> {
        Ok(self.scripts.lock().iter().find(|s| s.id == id).cloned())
    }

    async fn list(&self, limit: i64, skip: i64) -> AppResult<Vec<Script>> {
        Ok(page(self.scripts.lock().iter().rev().cloned(), limit, skip))
    }

    async fn create(&self, script: &Script) -> AppResult<Script> {
        self.scripts.lock().push(script.clone());
        Ok(script.clone())
    }
}

type SharedLogs = Arc<Mutex<Vec<CallLog>>>;

/// Campaign store that writes call logs into an [`InMemoryCallLogs`]
pub struct InMemoryCampaigns {
    campaigns: Mutex<Vec<Campaign>>,
    logs: SharedLogs,
    reject_calls: bool,
}

impl InMemoryCampaigns {
    pub fn writing_to(call_logs: &InMemoryCallLogs) -> Self {
        Self {
            campaigns: Mutex::new(Vec::new()),
            logs: call_logs.logs.clone(),
            reject_calls: false,
        }
    }

    /// Store whose call log inserts always fail
    pub fn rejecting_calls(call_logs: &InMemoryCallLogs) -> Self {
        Self {
            reject_calls: true,
            ..Self::writing_to(call_logs)
        }
    }

    fn with<T>(&self, id: Uuid, f: impl FnOnce(&mut Campaign) -> T) -> AppResult<T> {
        let mut campaigns = self.campaigns.lock();
        let campaign = campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::CampaignNotFound(id.to_string()))?;
        Ok(f(campaign))
    }
}

fn count_by_status<'a>(logs: impl Iterator<Item = &'a CallLog>) -> CampaignStats {
    let mut stats = CampaignStats::default();
    for log in logs {
        stats.total += 1;
        match log.status {
            CallStatus::Pending => stats.pending += 1,
            CallStatus::Dialing => stats.dialing += 1,
            CallStatus::Answered => stats.answered += 1,
            CallStatus::Busy => stats.busy += 1,
            CallStatus::Noanswer => stats.noanswer += 1,
            CallStatus::Failed => stats.failed += 1,
            CallStatus::Completed => stats.completed += 1,
        }
    }
    stats
}

#[async_trait]
impl CampaignRepository for InMemoryCampaigns {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Campaign>> {
        Ok(self.campaigns.lock().iter().find(|c| c.id == id).cloned())
    }

    async fn list(
        &self,
        status: Option<CampaignStatus>,
        limit: i64,
        skip: i64,
    ) -> AppResult<Vec<Campaign>> {
        let campaigns = self.campaigns.lock();
        let matching = campaigns
            .iter()
            .rev()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned();
        Ok(page(matching, limit, skip))
    }

    async fn create(&self, campaign: &Campaign, calls: &[CallLog]) -> AppResult<Campaign> {
        if self.reject_calls && !calls.is_empty() {
            return Err(AppError::Database("Failed to insert call log".to_string()));
        }
        self.logs.lock().extend_from_slice(calls);
        self.campaigns.lock().push(campaign.clone());
        Ok(campaign.clone())
    }

    async fn update(&self, campaign: &Campaign) -> AppResult<Campaign> {
        self.with(campaign.id, |stored| {
            stored.name = campaign.name.clone();
            stored.concurrency = campaign.concurrency;
            stored.schedule = campaign.schedule.clone();
            stored.updated_at = campaign.updated_at;
            stored.clone()
        })
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: CampaignStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        self.with(id, |stored| {
            stored.status = status;
            stored.started_at = started_at.or(stored.started_at);
            stored.completed_at = completed_at.or(stored.completed_at);
            stored.updated_at = Utc::now();
        })
    }

    async fn hard_stop(
        &self,
        id: Uuid,
        hangup_cause: &str,
        completed_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut campaigns = self.campaigns.lock();
        let stored = campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::CampaignNotFound(id.to_string()))?;

        let mut logs = self.logs.lock();
        let mut cancelled = 0;
        for log in logs.iter_mut().filter(|l| l.campaign_id == id && l.is_open()) {
            log.status = CallStatus::Failed;
            log.hangup_cause = Some(hangup_cause.to_string());
            log.ended_at = Some(completed_at);
            cancelled += 1;
        }

        stored.stats = count_by_status(logs.iter().filter(|l| l.campaign_id == id));
        stored.status = CampaignStatus::Stopped;
        stored.completed_at = Some(completed_at);
        stored.updated_at = Utc::now();
        Ok(cancelled)
    }
}

#[derive(Default)]
pub struct InMemoryCallLogs {
    logs: SharedLogs,
}

#[async_trait]
impl CallLogRepository for InMemoryCallLogs {
    async fn list_by_campaign(
        &self,
        campaign_id: Uuid,
        status: Option<CallStatus>,
        limit: i64,
        skip: i64,
    ) -> AppResult<Vec<CallLog>> {
        let logs = self.logs.lock();
        let matching = logs
            .iter()
            .rev()
            .filter(|l| l.campaign_id == campaign_id)
            .filter(|l| status.map_or(true, |s| l.status == s))
            .cloned();
        Ok(page(matching, limit, skip))
    }
}

#[derive(Default)]
pub struct InMemoryChatMessages {
    messages: Mutex<Vec<ChatMessage>>,
}

impl InMemoryChatMessages {
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

#[async_trait]
impl ChatMessageRepository for InMemoryChatMessages {
    async fn append(&self, message: &ChatMessage) -> AppResult<()> {
        self.messages.lock().push(message.clone());
        Ok(())
    }

    async fn history(&self, session_id: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let messages = self.messages.lock();
        let session: Vec<ChatMessage> = messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        let start = session.len().saturating_sub(limit as usize);
        Ok(session[start..].to_vec())
    }

    async fn transcript(&self, session_id: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        Ok(self
            .messages
            .lock()
            .iter()
            .filter(|m| m.session_id == session_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete_session(&self, session_id: &str) -> AppResult<u64> {
        let mut messages = self.messages.lock();
        let before = messages.len();
        messages.retain(|m| m.session_id != session_id);
        Ok((before - messages.len()) as u64)
    }
}

/// Chat model with a fixed outcome that records the last prompt
pub struct ScriptedModel {
    configured: bool,
    answer: Option<String>,
    last_prompt: Mutex<Vec<LlmMessage>>,
}

impl ScriptedModel {
    pub fn answering(answer: &str) -> Self {
        Self {
            configured: true,
            answer: Some(answer.to_string()),
            last_prompt: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            configured: true,
            answer: None,
            last_prompt: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::failing()
        }
    }

    pub fn last_prompt(&self) -> Vec<LlmMessage> {
        self.last_prompt.lock().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn reply(&self, messages: &[LlmMessage]) -> Result<String, IntegrationError> {
        *self.last_prompt.lock() = messages.to_vec();
        self.answer
            .clone()
            .ok_or_else(|| IntegrationError::Status {
                status: 500,
                body: "model unavailable".to_string(),
            })
    }
}
