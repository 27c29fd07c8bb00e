//! Repository implementations
//!
//! Concrete PostgreSQL repositories. The campaign and chatbot stores
//! implement the traits defined in velora-core; the CRM tables are
//! accessed through inherent methods.

pub mod active_call_repo;
pub mod call_log_repo;
pub mod call_record_repo;
pub mod campaign_repo;
pub mod chat_repo;
pub mod crm_user_repo;
pub mod customer_repo;
pub mod dealer_repo;
pub mod script_repo;
pub mod stats_repo;
pub mod status_check_repo;
pub mod tariff_repo;
pub mod trunk_repo;

pub use active_call_repo::PgActiveCallRepository;
pub use call_log_repo::PgCallLogRepository;
pub use call_record_repo::PgCallRecordRepository;
pub use campaign_repo::PgCampaignRepository;
pub use chat_repo::PgChatMessageRepository;
pub use crm_user_repo::PgCrmUserRepository;
pub use customer_repo::PgCustomerRepository;
pub use dealer_repo::PgDealerRepository;
pub use script_repo::PgScriptRepository;
pub use stats_repo::PgStatisticsRepository;
pub use status_check_repo::PgStatusCheckRepository;
pub use tariff_repo::PgTariffRepository;
pub use trunk_repo::PgTrunkSettingsRepository;
