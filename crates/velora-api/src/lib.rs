//! API layer for Velora
//!
//! HTTP handlers for the VoIP CRM, the softswitch bridge, the auto-dialer
//! campaigns, the chatbot and the vendor proxies.
//!
//! Handlers expect the following application data:
//!
//! - `web::Data<PgPool>` for the CRM routes
//! - `web::Data<SippyClient>`, `web::Data<ElevenLabsClient>`,
//!   `web::Data<IssabelClient>` and `web::Data<MmClient>` for the proxies
//! - `web::Data<PgCampaignService>` and `web::Data<PgChatService>`

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

use actix_web::web;
use velora_db::{
    PgCallLogRepository, PgCampaignRepository, PgChatMessageRepository, PgScriptRepository,
};
use velora_integrations::LlmClient;
use velora_services::{CampaignService, ChatService};

/// Campaign service backed by PostgreSQL
pub type PgCampaignService =
    CampaignService<PgScriptRepository, PgCampaignRepository, PgCallLogRepository>;

/// Chat service backed by PostgreSQL and the LLM endpoint
pub type PgChatService = ChatService<PgChatMessageRepository, LlmClient>;

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(handlers::configure_status)
            .configure(handlers::configure_voip_crm)
            .configure(handlers::configure_sippy)
            .configure(handlers::configure_chatbot)
            .configure(handlers::configure_elevenlabs)
            .configure(handlers::configure_issabel)
            .configure(handlers::configure_mm),
    )
    .configure(handlers::configure_campaigns);
}
