//! Call models
//!
//! Active calls tracked by the CRM and stored call detail records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Active call lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActiveCallStatus {
    /// Call in progress
    #[default]
    Active,
    /// Call hung up through the API
    Terminated,
}

impl fmt::Display for ActiveCallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveCallStatus::Active => write!(f, "active"),
            ActiveCallStatus::Terminated => write!(f, "terminated"),
        }
    }
}

impl ActiveCallStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(ActiveCallStatus::Active),
            "terminated" => Some(ActiveCallStatus::Terminated),
            _ => None,
        }
    }
}

/// Call currently in progress on a customer trunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveCall {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub caller: String,
    pub callee: String,
    pub trunk: String,
    /// Elapsed seconds at last report
    pub duration: i32,
    pub codec: String,
    pub country: String,
    pub city: Option<String>,
    pub status: ActiveCallStatus,
    pub started_at: DateTime<Utc>,
}

/// Stored call detail record with optional AI analysis fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Unique identifier
    pub id: Uuid,

    /// Customer that placed or received the call
    pub customer_id: Uuid,

    /// Caller number (ANI/CLI)
    pub caller_number: String,

    /// Called number (DNIS)
    pub called_number: String,

    pub country: String,

    pub city: Option<String>,

    /// Duration in seconds
    pub duration: i32,

    pub call_date: DateTime<Utc>,

    /// Total cost of the call
    pub cost: Decimal,

    /// Spam likelihood in [0, 1]
    pub ai_spam_score: Option<f64>,

    pub ai_sentiment: Option<String>,

    pub ai_noise_filtered: bool,

    pub ai_transcription: Option<String>,

    /// Recording location
    pub audio_url: Option<String>,

    pub codec: Option<String>,
}

impl CallRecord {
    /// Duration expressed in minutes
    #[inline]
    pub fn minutes(&self) -> f64 {
        f64::from(self.duration) / 60.0
    }

    /// Duration formatted as `mm:ss`
    pub fn display_duration(&self) -> String {
        format!("{:02}:{:02}", self.duration / 60, self.duration % 60)
    }
}
