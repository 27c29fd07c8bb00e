//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sippy: SippyConfig,
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,
    #[serde(default)]
    pub issabel: IssabelConfig,
    #[serde(default)]
    pub mm: MmConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma separated list of allowed CORS origins, `*` allows any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "*".to_string()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply pending migrations at start-up
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

/// SippySoft XML-RPC softswitch configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SippyConfig {
    /// Full XML-RPC endpoint URL, e.g. `https://switch.example.com/xmlapi/xmlapi`
    #[serde(default)]
    pub rpc_url: String,

    /// Digest username
    #[serde(default)]
    pub username: String,

    /// Digest password
    #[serde(default)]
    pub password: String,

    /// Accept self-signed certificates on the softswitch
    #[serde(default = "default_true")]
    pub disable_tls_verify: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_sippy_timeout")]
    pub timeout_secs: u64,
}

fn default_sippy_timeout() -> u64 {
    30
}

impl Default for SippyConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            username: String::new(),
            password: String::new(),
            disable_tls_verify: true,
            timeout_secs: default_sippy_timeout(),
        }
    }
}

impl SippyConfig {
    /// URL, user and password are all present
    pub fn is_configured(&self) -> bool {
        !self.rpc_url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

/// ElevenLabs voice API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: Option<String>,

    #[serde(default = "default_elevenlabs_url")]
    pub base_url: String,

    /// Voice used by text-to-speech when the request names none
    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,

    #[serde(default = "default_elevenlabs_timeout")]
    pub timeout_secs: u64,
}

fn default_elevenlabs_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_elevenlabs_timeout() -> u64 {
    30
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_elevenlabs_url(),
            default_voice_id: default_voice_id(),
            timeout_secs: default_elevenlabs_timeout(),
        }
    }
}

/// Issabel PBX `pbxapi` configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct IssabelConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    #[serde(default)]
    pub disable_tls_verify: bool,
}

impl IssabelConfig {
    pub fn is_configured(&self) -> bool {
        [&self.base_url, &self.username, &self.password]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

/// MM dialer partner API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MmConfig {
    #[serde(default = "default_mm_url")]
    pub base_url: String,

    pub api_key: Option<String>,

    #[serde(default = "default_mm_timeout")]
    pub timeout_secs: u64,
}

fn default_mm_url() -> String {
    "http://localhost:81".to_string()
}

fn default_mm_timeout() -> u64 {
    20
}

impl Default for MmConfig {
    fn default() -> Self {
        Self {
            base_url: default_mm_url(),
            api_key: None,
            timeout_secs: default_mm_timeout(),
        }
    }
}

/// Chat LLM configuration (OpenAI-compatible chat completions API)
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,

    #[serde(default = "default_llm_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Number of stored messages replayed to the model as context
    #[serde(default = "default_history_window")]
    pub history_window: i64,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_system_prompt() -> String {
    "You are the customer service assistant of Velora, an AI-first telecom operator \
     in Turkey offering geographic and 0850 numbers, cloud PBX, call center, bulk SMS, \
     OTP SMS and IYS services. Only help with Velora and telecom topics, stay \
     professional, and answer in Turkish."
        .to_string()
}

fn default_history_window() -> i64 {
    20
}

fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_url(),
            model: default_llm_model(),
            system_prompt: default_system_prompt(),
            history_window: default_history_window(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Unprefixed variable names accepted for compatibility with existing `.env` files
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("CORS_ORIGINS", "server.cors_origins"),
    ("SIPPY_RPC_URL", "sippy.rpc_url"),
    ("SIPPY_RPC_USER", "sippy.username"),
    ("SIPPY_RPC_PASS", "sippy.password"),
    ("SIPPY_DISABLE_TLS_VERIFY", "sippy.disable_tls_verify"),
    ("ELEVENLABS_API_KEY", "elevenlabs.api_key"),
    ("ELEVENLABS_BASE_URL", "elevenlabs.base_url"),
    ("ELEVENLABS_VOICE_ID", "elevenlabs.default_voice_id"),
    ("ISSABEL_BASE_URL", "issabel.base_url"),
    ("ISSABEL_USERNAME", "issabel.username"),
    ("ISSABEL_PASSWORD", "issabel.password"),
    ("ISSABEL_DISABLE_TLS_VERIFY", "issabel.disable_tls_verify"),
    ("MM_API_URL", "mm.base_url"),
    ("MM_API_KEY", "mm.api_key"),
    ("LLM_API_KEY", "llm.api_key"),
];

impl AppConfig {
    /// Load configuration from defaults, optional config files and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8001)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.url", "postgresql://localhost/velora")?
            .set_default("database.max_connections", 10)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with VELORA_ prefix
            .add_source(
                Environment::with_prefix("VELORA")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in LEGACY_ENV_KEYS {
            builder = builder.set_override_option(*key, env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("VELORA").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sippy_config() {
        let config = SippyConfig::default();
        assert!(config.disable_tls_verify);
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_sippy_configured() {
        let config = SippyConfig {
            rpc_url: "https://switch.local/xmlapi/xmlapi".to_string(),
            username: "ssp-root".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn test_issabel_configured_requires_all_fields() {
        let mut config = IssabelConfig {
            base_url: Some("http://pbx.local".to_string()),
            username: Some("admin".to_string()),
            password: None,
            disable_tls_verify: false,
        };
        assert!(!config.is_configured());

        config.password = Some(String::new());
        assert!(!config.is_configured());

        config.password = Some("pw".to_string());
        assert!(config.is_configured());
    }

    #[test]
    fn test_llm_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.history_window, 20);
        assert!(config.api_key.is_none());
    }
}
