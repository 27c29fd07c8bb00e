//! Velora vendor API clients
//!
//! Thin reqwest wrappers around the third-party HTTP APIs the CRM proxies:
//! ElevenLabs (outbound AI calls, text-to-speech), the Issabel `pbxapi`, the
//! MM dialer partner API and an OpenAI-compatible chat completions endpoint.
//! Each client is built once from its configuration section and shared.

mod elevenlabs;
mod error;
mod http;
mod issabel;
mod llm;
mod mm;

pub use elevenlabs::{
    ElevenLabsClient, OutboundCall, OutboundCallRequest, Speech, DEFAULT_OUTPUT_FORMAT,
    MAX_TTS_TEXT_CHARS, TTS_MODEL_ID,
};
pub use error::IntegrationError;
pub use issabel::{IssabelClient, IssabelHealth};
pub use llm::{LlmClient, LlmMessage};
pub use mm::{AddNumbersToCall, MmClient, ADD_NUMBERS_PATH};
