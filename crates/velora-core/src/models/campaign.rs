//! Auto-dialer campaign models
//!
//! Scripts are the TTS text a campaign plays; a campaign owns one call log
//! per number it dials. Only the bookkeeping lives here, the dialing worker
//! is an external process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_SCRIPT_LANGUAGE: &str = "en-US";
pub const DEFAULT_CAMPAIGN_CONTEXT: &str = "from-internal";
pub const MIN_CONCURRENCY: i32 = 1;
pub const MAX_CONCURRENCY: i32 = 10;

/// TTS script played by a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub id: Uuid,
    pub name: String,
    pub language: String,
    pub text: String,
    /// Placeholder names substituted per call
    pub variables: Vec<String>,
    pub voice_id: Option<String>,
    /// Pre-rendered audio reference
    pub audio_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campaign lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Scheduled,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Running => "running",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

impl CampaignStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(CampaignStatus::Draft),
            "scheduled" => Some(CampaignStatus::Scheduled),
            "running" => Some(CampaignStatus::Running),
            "paused" => Some(CampaignStatus::Paused),
            "completed" => Some(CampaignStatus::Completed),
            "stopped" => Some(CampaignStatus::Stopped),
            _ => None,
        }
    }

    /// Campaign fields may only be edited while not dialing
    pub fn can_edit(&self) -> bool {
        matches!(self, CampaignStatus::Draft | CampaignStatus::Paused)
    }

    pub fn can_start(&self) -> bool {
        *self != CampaignStatus::Running
    }

    pub fn can_pause(&self) -> bool {
        *self == CampaignStatus::Running
    }
}

/// How a stop request treats calls already in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StopMode {
    /// Let dialing calls finish
    #[default]
    Graceful,
    /// Drop everything immediately
    Hard,
}

impl fmt::Display for StopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopMode::Graceful => write!(f, "graceful"),
            StopMode::Hard => write!(f, "hard"),
        }
    }
}

impl StopMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "graceful" => Some(StopMode::Graceful),
            "hard" => Some(StopMode::Hard),
            _ => None,
        }
    }
}

/// Per-status call counters of a campaign
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub total: i64,
    pub pending: i64,
    pub dialing: i64,
    pub answered: i64,
    pub busy: i64,
    pub noanswer: i64,
    pub failed: i64,
    pub completed: i64,
}

impl CampaignStats {
    /// Fresh counters: every number starts pending
    pub fn new(total: i64) -> Self {
        Self {
            total,
            pending: total,
            ..Default::default()
        }
    }
}

/// Outbound auto-dialer campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub script_id: Uuid,
    pub trunk: String,
    /// Dialplan context used for originate
    pub context: String,
    /// Parallel calls, 1..=10
    pub concurrency: i32,
    pub numbers: Vec<String>,
    /// Opaque schedule document owned by the dialer
    pub schedule: Option<serde_json::Value>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub stats: CampaignStats,
}

/// Per-number call state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    #[default]
    Pending,
    Dialing,
    Answered,
    Busy,
    Noanswer,
    Failed,
    Completed,
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallStatus::Pending => "pending",
            CallStatus::Dialing => "dialing",
            CallStatus::Answered => "answered",
            CallStatus::Busy => "busy",
            CallStatus::Noanswer => "noanswer",
            CallStatus::Failed => "failed",
            CallStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

impl CallStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(CallStatus::Pending),
            "dialing" => Some(CallStatus::Dialing),
            "answered" => Some(CallStatus::Answered),
            "busy" => Some(CallStatus::Busy),
            "noanswer" => Some(CallStatus::Noanswer),
            "failed" => Some(CallStatus::Failed),
            "completed" => Some(CallStatus::Completed),
            _ => None,
        }
    }
}

/// One dialed (or to-be-dialed) number of a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLog {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub number: String,
    pub status: CallStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub answered_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds
    pub duration: Option<i32>,
    pub hangup_cause: Option<String>,
    /// Digits pressed by the callee
    pub dtmf: Option<String>,
    pub audio_id: Option<String>,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
}

impl CallLog {
    /// Call still waiting for or in the middle of dialing
    pub fn is_open(&self) -> bool {
        matches!(self.status, CallStatus::Pending | CallStatus::Dialing)
    }

    /// New pending entry for `number`
    pub fn pending(campaign_id: Uuid, number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            number: number.into(),
            status: CallStatus::Pending,
            started_at: None,
            answered_at: None,
            ended_at: None,
            duration: None,
            hangup_cause: None,
            dtmf: None,
            audio_id: None,
            retry_count: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_status_can_edit() {
        assert!(CampaignStatus::Draft.can_edit());
        assert!(CampaignStatus::Paused.can_edit());
        assert!(!CampaignStatus::Running.can_edit());
        assert!(!CampaignStatus::Completed.can_edit());
        assert!(!CampaignStatus::Stopped.can_edit());
    }

    #[test]
    fn test_campaign_status_parse() {
        assert_eq!(CampaignStatus::from_str("Running"), Some(CampaignStatus::Running));
        assert_eq!(CampaignStatus::from_str("archived"), None);
        assert_eq!(CampaignStatus::Scheduled.to_string(), "scheduled");
    }

    #[test]
    fn test_stats_new() {
        let stats = CampaignStats::new(3);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.answered, 0);
    }

    #[test]
    fn test_stats_json_shape() {
        let json = serde_json::to_value(CampaignStats::new(2)).unwrap();
        assert_eq!(json["noanswer"], 0);
        assert_eq!(json["pending"], 2);
    }

    #[test]
    fn test_pending_call_log() {
        let campaign_id = Uuid::new_v4();
        let log = CallLog::pending(campaign_id, "905551112233");
        assert_eq!(log.status, CallStatus::Pending);
        assert_eq!(log.retry_count, 0);
        assert_eq!(log.campaign_id, campaign_id);
    }

    #[test]
    fn test_stop_mode_parse() {
        assert_eq!(StopMode::from_str("HARD"), Some(StopMode::Hard));
        assert_eq!(StopMode::default(), StopMode::Graceful);
        assert_eq!(StopMode::from_str("now"), None);
    }
}
