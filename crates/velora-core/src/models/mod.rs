//! Domain models for Velora
//!
//! This module contains all the core domain models used throughout the application.

pub mod call;
pub mod campaign;
pub mod chat;
pub mod crm_user;
pub mod customer;
pub mod dealer;
pub mod statistics;
pub mod status_check;
pub mod tariff;
pub mod trunk;

pub use call::{ActiveCall, ActiveCallStatus, CallRecord};
pub use campaign::{CallLog, CallStatus, Campaign, CampaignStats, CampaignStatus, Script, StopMode};
pub use chat::{ChatMessage, ChatRole};
pub use crm_user::CrmUser;
pub use customer::Customer;
pub use dealer::Dealer;
pub use statistics::CrmStatistics;
pub use status_check::StatusCheck;
pub use tariff::Tariff;
pub use trunk::TrunkSettings;
