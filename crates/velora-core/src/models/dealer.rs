//! Dealer model
//!
//! Dealers resell Velora services and own a set of customers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reseller account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dealer {
    /// Unique identifier
    pub id: Uuid,

    /// Company or contact name
    pub name: String,

    pub email: String,

    pub phone: String,

    /// Free-form status, `active` on creation
    pub status: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Number of customers attached to this dealer
    pub total_customers: i32,

    /// Aggregated minutes across customers
    pub total_minutes: f64,

    /// Aggregated calls across customers
    pub total_calls: i32,
}

impl Dealer {
    /// Build a fresh dealer with zeroed counters
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            status: "active".to_string(),
            created_at: Utc::now(),
            total_customers: 0,
            total_minutes: 0.0,
            total_calls: 0,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dealer_defaults() {
        let dealer = Dealer::new("Acme Telekom", "ops@acme.example", "+905551112233");
        assert!(dealer.is_active());
        assert_eq!(dealer.total_customers, 0);
        assert_eq!(dealer.total_calls, 0);
        assert_eq!(dealer.total_minutes, 0.0);
    }
}
