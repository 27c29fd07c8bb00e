//! VoIP CRM DTOs
//!
//! Request and response types for the dealer, customer, user, trunk,
//! call and tariff endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use velora_core::models::{
    customer::DEFAULT_CURRENCY, ActiveCall, ActiveCallStatus, CallRecord, CrmUser, Customer,
    Dealer, Tariff, TrunkSettings,
};
use velora_core::AppError;

fn default_status() -> String {
    "active".to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn decimal_from_f64(value: f64, field: &str) -> Result<Decimal, AppError> {
    Decimal::from_f64(value)
        .ok_or_else(|| AppError::Validation(format!("{} is not a valid amount", field)))
}

// ==================== Dealers ====================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DealerCreateRequest {
    #[validate(length(min = 1, message = "Dealer name is required"))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 32))]
    pub phone: String,

    #[serde(default = "default_status")]
    pub status: String,
}

impl DealerCreateRequest {
    pub fn to_dealer(&self) -> Dealer {
        Dealer {
            status: self.status.clone(),
            ..Dealer::new(&self.name, &self.email, &self.phone)
        }
    }
}

// ==================== Customers ====================

/// Customer create and full-replace body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerRequest {
    pub dealer_id: Uuid,

    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,

    #[validate(length(min = 1))]
    pub tariff: String,

    pub number: Option<String>,

    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,

    #[serde(default = "default_status")]
    pub status: String,
}

impl CustomerRequest {
    pub fn to_customer(&self) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            dealer_id: self.dealer_id,
            name: self.name.clone(),
            tariff: self.tariff.clone(),
            number: self.number.clone(),
            currency: self.currency.clone(),
            total_minutes: 0.0,
            total_calls: 0,
            status: self.status.clone(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerFilterParams {
    pub dealer_id: Option<Uuid>,
}

// ==================== CRM users ====================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CrmUserCreateRequest {
    pub customer_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,

    pub extension: Option<String>,

    #[serde(default = "default_status")]
    pub status: String,
}

impl CrmUserCreateRequest {
    pub fn to_user(&self) -> CrmUser {
        CrmUser {
            id: Uuid::new_v4(),
            customer_id: self.customer_id,
            username: self.username.clone(),
            extension: self.extension.clone(),
            status: self.status.clone(),
            total_minutes: 0.0,
            total_calls: 0,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrmUserFilterParams {
    pub customer_id: Option<Uuid>,
}

// ==================== Trunk settings ====================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TrunkSettingsRequest {
    pub customer_id: Uuid,

    #[validate(length(min = 1, message = "ip_address is required"))]
    pub ip_address: String,

    #[serde(default = "default_port")]
    #[validate(range(min = 1, max = 65535))]
    pub port: i32,

    #[serde(default = "default_codec")]
    pub codec: String,

    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default = "default_max_calls")]
    #[validate(range(min = 1))]
    pub max_calls: i32,

    pub auth_username: Option<String>,
    pub auth_password: Option<String>,

    #[serde(default = "default_register_interval")]
    #[validate(range(min = 0))]
    pub register_interval: i32,

    #[serde(default = "default_true")]
    pub nat_traversal: bool,
}

fn default_port() -> i32 {
    5060
}

fn default_codec() -> String {
    "G.711".to_string()
}

fn default_protocol() -> String {
    "UDP".to_string()
}

fn default_max_calls() -> i32 {
    10
}

fn default_register_interval() -> i32 {
    3600
}

fn default_true() -> bool {
    true
}

impl From<TrunkSettingsRequest> for TrunkSettings {
    fn from(req: TrunkSettingsRequest) -> Self {
        Self {
            customer_id: req.customer_id,
            ip_address: req.ip_address,
            port: req.port,
            codec: req.codec,
            protocol: req.protocol,
            max_calls: req.max_calls,
            auth_username: req.auth_username,
            auth_password: req.auth_password,
            register_interval: req.register_interval,
            nat_traversal: req.nat_traversal,
        }
    }
}

// ==================== Active calls ====================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActiveCallCreateRequest {
    pub customer_id: Uuid,

    #[validate(length(min = 1))]
    pub caller: String,

    #[validate(length(min = 1))]
    pub callee: String,

    pub trunk: String,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub duration: i32,

    pub codec: String,
    pub country: String,
    pub city: Option<String>,
}

impl ActiveCallCreateRequest {
    pub fn to_active_call(&self) -> ActiveCall {
        ActiveCall {
            id: Uuid::new_v4(),
            customer_id: self.customer_id,
            caller: self.caller.clone(),
            callee: self.callee.clone(),
            trunk: self.trunk.clone(),
            duration: self.duration,
            codec: self.codec.clone(),
            country: self.country.clone(),
            city: self.city.clone(),
            status: ActiveCallStatus::Active,
            started_at: Utc::now(),
        }
    }
}

// ==================== Call records ====================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CallRecordCreateRequest {
    pub customer_id: Uuid,

    #[validate(length(min = 1))]
    pub caller_number: String,

    #[validate(length(min = 1))]
    pub called_number: String,

    pub country: String,
    pub city: Option<String>,

    /// Seconds
    #[validate(range(min = 0))]
    pub duration: i32,

    pub call_date: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub cost: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub ai_spam_score: Option<f64>,
    pub ai_sentiment: Option<String>,
    #[serde(default)]
    pub ai_noise_filtered: bool,
    pub ai_transcription: Option<String>,
    pub audio_url: Option<String>,
    pub codec: Option<String>,
}

impl CallRecordCreateRequest {
    pub fn to_call_record(&self) -> Result<CallRecord, AppError> {
        Ok(CallRecord {
            id: Uuid::new_v4(),
            customer_id: self.customer_id,
            caller_number: self.caller_number.clone(),
            called_number: self.called_number.clone(),
            country: self.country.clone(),
            city: self.city.clone(),
            duration: self.duration,
            call_date: self.call_date.unwrap_or_else(Utc::now),
            cost: decimal_from_f64(self.cost, "cost")?,
            ai_spam_score: self.ai_spam_score,
            ai_sentiment: self.ai_sentiment.clone(),
            ai_noise_filtered: self.ai_noise_filtered,
            ai_transcription: self.ai_transcription.clone(),
            audio_url: self.audio_url.clone(),
            codec: self.codec.clone(),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CallRecordFilterParams {
    pub customer_id: Option<Uuid>,

    #[serde(default = "default_call_record_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: i64,
}

fn default_call_record_limit() -> i64 {
    100
}

#[derive(Debug, Clone, Serialize)]
pub struct CallRecordResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub caller_number: String,
    pub called_number: String,
    pub country: String,
    pub city: Option<String>,
    pub duration: i32,
    pub call_date: DateTime<Utc>,
    pub cost: f64,
    pub ai_spam_score: Option<f64>,
    pub ai_sentiment: Option<String>,
    pub ai_noise_filtered: bool,
    pub ai_transcription: Option<String>,
    pub audio_url: Option<String>,
    pub codec: Option<String>,
}

impl From<CallRecord> for CallRecordResponse {
    fn from(record: CallRecord) -> Self {
        Self {
            id: record.id,
            customer_id: record.customer_id,
            caller_number: record.caller_number,
            called_number: record.called_number,
            country: record.country,
            city: record.city,
            duration: record.duration,
            call_date: record.call_date,
            cost: record.cost.to_f64().unwrap_or(0.0),
            ai_spam_score: record.ai_spam_score,
            ai_sentiment: record.ai_sentiment,
            ai_noise_filtered: record.ai_noise_filtered,
            ai_transcription: record.ai_transcription,
            audio_url: record.audio_url,
            codec: record.codec,
        }
    }
}

// ==================== Tariffs ====================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TariffCreateRequest {
    #[validate(length(min = 1, message = "Tariff name is required"))]
    pub name: String,

    #[validate(range(min = 0.0))]
    pub price_per_minute: f64,

    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,

    pub description: Option<String>,
}

impl TariffCreateRequest {
    pub fn to_tariff(&self) -> Result<Tariff, AppError> {
        Ok(Tariff {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            price_per_minute: decimal_from_f64(self.price_per_minute, "price_per_minute")?,
            currency: self.currency.clone(),
            description: self.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TariffResponse {
    pub id: Uuid,
    pub name: String,
    pub price_per_minute: f64,
    pub currency: String,
    pub description: Option<String>,
}

impl From<Tariff> for TariffResponse {
    fn from(tariff: Tariff) -> Self {
        Self {
            id: tariff.id,
            name: tariff.name,
            price_per_minute: tariff.price_per_minute.to_f64().unwrap_or(0.0),
            currency: tariff.currency,
            description: tariff.description,
        }
    }
}
