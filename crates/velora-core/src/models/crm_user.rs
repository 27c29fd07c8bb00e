//! CRM user model
//!
//! Users are extensions/SIP accounts under a customer. They are not login
//! accounts for this API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extension-level user of a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmUser {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub username: String,
    pub extension: Option<String>,
    pub status: String,
    pub total_minutes: f64,
    pub total_calls: i32,
    pub created_at: DateTime<Utc>,
}
