//! Campaign service
//!
//! Bookkeeping for the auto-dialer: scripts, campaigns and their per-number
//! call logs. The dialing worker itself is a separate process that reads the
//! pending call logs; this service only enforces the lifecycle:
//!
//! - edits are allowed while a campaign is draft or paused
//! - a campaign can be started unless it is already running
//! - only a running campaign can be paused
//! - stop is always allowed; a hard stop also fails every open call log

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use velora_core::{
    models::campaign::{
        DEFAULT_CAMPAIGN_CONTEXT, DEFAULT_SCRIPT_LANGUAGE, MAX_CONCURRENCY, MIN_CONCURRENCY,
    },
    models::{CallLog, CallStatus, Campaign, CampaignStats, CampaignStatus, Script, StopMode},
    traits::{CallLogRepository, CampaignRepository, ScriptRepository},
    AppError, AppResult,
};

use crate::constants::HARD_STOP_HANGUP_CAUSE;

/// Input of [`CampaignService::create_script`]
#[derive(Debug, Clone)]
pub struct NewScript {
    pub name: String,
    pub language: Option<String>,
    pub text: String,
    pub variables: Vec<String>,
    pub voice_id: Option<String>,
}

/// Input of [`CampaignService::create_campaign`]
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub script_id: Uuid,
    pub trunk: String,
    pub context: Option<String>,
    pub concurrency: Option<i32>,
    pub numbers: Vec<String>,
    pub schedule: Option<serde_json::Value>,
}

/// Editable campaign fields; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct CampaignChanges {
    pub name: Option<String>,
    pub concurrency: Option<i32>,
    pub schedule: Option<serde_json::Value>,
}

fn check_concurrency(concurrency: i32) -> AppResult<()> {
    if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
        return Err(AppError::Validation(format!(
            "concurrency must be between {} and {}",
            MIN_CONCURRENCY, MAX_CONCURRENCY
        )));
    }
    Ok(())
}

pub struct CampaignService<S: ScriptRepository, C: CampaignRepository, L: CallLogRepository> {
    scripts: Arc<S>,
    campaigns: Arc<C>,
    call_logs: Arc<L>,
}

impl<S, C, L> CampaignService<S, C, L>
where
    S: ScriptRepository,
    C: CampaignRepository,
    L: CallLogRepository,
{
    pub fn new(scripts: Arc<S>, campaigns: Arc<C>, call_logs: Arc<L>) -> Self {
        Self {
            scripts,
            campaigns,
            call_logs,
        }
    }

    // ==================== Scripts ====================

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_script(&self, input: NewScript) -> AppResult<Script> {
        let now = Utc::now();
        let script = Script {
            id: Uuid::new_v4(),
            name: input.name,
            language: input
                .language
                .unwrap_or_else(|| DEFAULT_SCRIPT_LANGUAGE.to_string()),
            text: input.text,
            variables: input.variables,
            voice_id: input.voice_id,
            audio_id: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.scripts.create(&script).await?;
        info!("Script created: {}", created.id);
        Ok(created)
    }

    pub async fn list_scripts(&self, limit: i64, skip: i64) -> AppResult<Vec<Script>> {
        self.scripts.list(limit, skip).await
    }

    pub async fn get_script(&self, id: Uuid) -> AppResult<Script> {
        self.scripts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ScriptNotFound(id.to_string()))
    }

    // ==================== Campaigns ====================

    /// Create a draft campaign with one pending call log per number
    #[instrument(skip(self, input), fields(name = %input.name, numbers = input.numbers.len()))]
    pub async fn create_campaign(&self, input: NewCampaign) -> AppResult<Campaign> {
        let concurrency = input.concurrency.unwrap_or(MIN_CONCURRENCY);
        check_concurrency(concurrency)?;

        if self.scripts.find_by_id(input.script_id).await?.is_none() {
            warn!("Campaign references unknown script {}", input.script_id);
            return Err(AppError::ScriptNotFound(input.script_id.to_string()));
        }

        let now = Utc::now();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            name: input.name,
            script_id: input.script_id,
            trunk: input.trunk,
            context: input
                .context
                .unwrap_or_else(|| DEFAULT_CAMPAIGN_CONTEXT.to_string()),
            concurrency,
            stats: CampaignStats::new(input.numbers.len() as i64),
            numbers: input.numbers,
            schedule: input.schedule,
            status: CampaignStatus::Draft,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        };

        let calls: Vec<CallLog> = campaign
            .numbers
            .iter()
            .map(|number| CallLog::pending(campaign.id, number.as_str()))
            .collect();

        let created = self.campaigns.create(&campaign, &calls).await?;

        info!("Campaign {} created with {} queued numbers", created.id, calls.len());
        Ok(created)
    }

    pub async fn list_campaigns(
        &self,
        status: Option<CampaignStatus>,
        limit: i64,
        skip: i64,
    ) -> AppResult<Vec<Campaign>> {
        self.campaigns.list(status, limit, skip).await
    }

    pub async fn get_campaign(&self, id: Uuid) -> AppResult<Campaign> {
        self.campaigns
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::CampaignNotFound(id.to_string()))
    }

    #[instrument(skip(self, changes))]
    pub async fn update_campaign(&self, id: Uuid, changes: CampaignChanges) -> AppResult<Campaign> {
        let mut campaign = self.get_campaign(id).await?;

        if !campaign.status.can_edit() {
            return Err(AppError::InvalidState(
                "Cannot update running or completed campaign".to_string(),
            ));
        }

        if let Some(concurrency) = changes.concurrency {
            check_concurrency(concurrency)?;
            campaign.concurrency = concurrency;
        }
        if let Some(name) = changes.name {
            campaign.name = name;
        }
        if let Some(schedule) = changes.schedule {
            campaign.schedule = Some(schedule);
        }
        campaign.updated_at = Utc::now();

        self.campaigns.update(&campaign).await
    }

    #[instrument(skip(self))]
    pub async fn start(&self, id: Uuid) -> AppResult<()> {
        let campaign = self.get_campaign(id).await?;

        if !campaign.status.can_start() {
            return Err(AppError::InvalidState("Campaign already running".to_string()));
        }

        self.campaigns
            .set_status(id, CampaignStatus::Running, Some(Utc::now()), None)
            .await?;
        info!("Campaign {} started (was {})", id, campaign.status);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn pause(&self, id: Uuid) -> AppResult<()> {
        let campaign = self.get_campaign(id).await?;

        if !campaign.status.can_pause() {
            return Err(AppError::InvalidState("Campaign not running".to_string()));
        }

        self.campaigns
            .set_status(id, CampaignStatus::Paused, None, None)
            .await?;
        info!("Campaign {} paused", id);
        Ok(())
    }

    /// Stop a campaign; a hard stop fails every call log not yet finished
    #[instrument(skip(self))]
    pub async fn stop(&self, id: Uuid, mode: StopMode) -> AppResult<()> {
        self.get_campaign(id).await?;

        match mode {
            StopMode::Hard => {
                let cancelled = self
                    .campaigns
                    .hard_stop(id, HARD_STOP_HANGUP_CAUSE, Utc::now())
                    .await?;
                info!("Hard stop of campaign {} cancelled {} calls", id, cancelled);
            }
            StopMode::Graceful => {
                self.campaigns
                    .set_status(id, CampaignStatus::Stopped, None, Some(Utc::now()))
                    .await?;
            }
        }
        info!("Campaign {} stopped ({} mode)", id, mode);
        Ok(())
    }

    pub async fn list_calls(
        &self,
        campaign_id: Uuid,
        status: Option<CallStatus>,
        limit: i64,
        skip: i64,
    ) -> AppResult<Vec<CallLog>> {
        self.call_logs
            .list_by_campaign(campaign_id, status, limit, skip)
            .await
    }
}
