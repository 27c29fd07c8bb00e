//! Tariff model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named per-minute price list entry assigned to customers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tariff {
    pub id: Uuid,
    pub name: String,
    pub price_per_minute: Decimal,
    pub currency: String,
    pub description: Option<String>,
}

impl Tariff {
    /// Cost of a call of `duration_secs`, billed per started second
    pub fn cost_for(&self, duration_secs: i32) -> Decimal {
        if duration_secs <= 0 {
            return Decimal::ZERO;
        }
        (self.price_per_minute * Decimal::from(duration_secs) / Decimal::from(60)).round_dp(4)
    }
}
