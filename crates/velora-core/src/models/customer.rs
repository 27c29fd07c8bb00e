//! Customer model
//!
//! Customers belong to a dealer and carry running usage totals that are
//! bumped whenever a call record is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default billing currency
pub const DEFAULT_CURRENCY: &str = "TRY";

/// End customer of a dealer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: Uuid,

    /// Owning dealer
    pub dealer_id: Uuid,

    pub name: String,

    /// Tariff name assigned to this customer
    pub tariff: String,

    /// Main DID number
    pub number: Option<String>,

    /// Currency code (ISO 4217)
    pub currency: String,

    /// Total billed minutes
    pub total_minutes: f64,

    /// Total number of calls
    pub total_calls: i32,

    pub status: String,

    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Minutes added to the running total for a call of `duration_secs`
    #[inline]
    pub fn minutes_for(duration_secs: i32) -> f64 {
        f64::from(duration_secs) / 60.0
    }
}
