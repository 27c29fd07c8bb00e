//! Business logic services for Velora
//!
//! Services own their repositories behind `Arc` and depend only on the
//! traits from `velora_core::traits`, so the PostgreSQL implementations can
//! be swapped for in-memory ones in tests.
//!
//! # Services
//!
//! - `CampaignService` - TTS scripts, campaign lifecycle and call log bookkeeping
//! - `ChatService` - chatbot replies through the LLM with canned fallbacks

pub mod campaign_service;
pub mod chat_service;

#[cfg(test)]
mod fakes;

pub use campaign_service::{CampaignChanges, CampaignService, NewCampaign, NewScript};
pub use chat_service::{ChatModel, ChatReply, ChatService};

/// Business logic constants
pub mod constants {
    /// Hangup cause written to call logs cancelled by a hard stop
    pub const HARD_STOP_HANGUP_CAUSE: &str = "campaign_stopped";

    /// Messages returned by the chat history endpoint
    pub const CHAT_HISTORY_LIMIT: i64 = 100;

    /// Reply when no LLM key is configured
    pub const NOT_CONFIGURED_REPLY: &str = "Üzgünüm, şu anda yapay zeka servisi yapılandırılmamış. \
         Lütfen 0850 000 00 00 numaralı telefondan bize ulaşın.";

    /// Reply when the LLM call fails
    pub const FALLBACK_REPLY: &str = "Merhaba! Ben Velora AI asistanıyım. Size nasıl yardımcı \
         olabilirim? Velora'nın bulut santral, toplu SMS, sabit numara hizmetleri hakkında \
         bilgi verebilirim.";
}
