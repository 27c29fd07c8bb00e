//! Dashboard statistics

use serde::{Deserialize, Serialize};

/// CRM-wide counters shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmStatistics {
    pub total_dealers: i64,
    pub total_customers: i64,
    pub total_users: i64,
    /// Calls with status `active`
    pub active_calls: i64,
    /// Sum of stored call record durations, in minutes
    pub total_call_duration_minutes: f64,
    /// Number of stored call records
    pub total_calls: i64,
}

impl CrmStatistics {
    /// Fill the call totals from a raw seconds sum
    pub fn with_call_totals(mut self, total_duration_secs: i64, total_calls: i64) -> Self {
        self.total_call_duration_minutes = total_duration_secs as f64 / 60.0;
        self.total_calls = total_calls;
        self
    }
}
