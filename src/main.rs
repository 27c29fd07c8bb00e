//! Velora VoIP CRM Backend Server
//!
//! Serves the CRM, softswitch, campaign, chatbot and vendor proxy routes.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use velora_api::{PgCampaignService, PgChatService};
use velora_core::AppConfig;
use velora_db::{
    create_pool, PgCallLogRepository, PgCampaignRepository, PgChatMessageRepository,
    PgScriptRepository,
};
use velora_integrations::{ElevenLabsClient, IssabelClient, LlmClient, MmClient};
use velora_services::{CampaignService, ChatService};
use velora_sippy::SippyClient;

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "velora_server={lvl},velora_api={lvl},velora_db={lvl},velora_sippy={lvl},\
             velora_integrations={lvl},velora_services={lvl},actix_web=info,sqlx=warn",
            lvl = log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

fn cors(origins: &str) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .max_age(3600);

    if origins.trim() == "*" {
        return cors.allow_any_origin();
    }

    let allowed: Vec<String> = origins.split(',').map(|o| o.trim().to_string()).collect();
    cors.allowed_origin_fn(move |origin, _req_head| {
        origin
            .to_str()
            .map(|o| allowed.iter().any(|a| a == o))
            .unwrap_or(false)
    })
    .supports_credentials()
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Velora CRM backend v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("Failed to load configuration")?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    let sippy = SippyClient::new(&config.sippy).context("Invalid SippySoft configuration")?;
    if !sippy.is_configured() {
        warn!("SippySoft credentials not set, /api/sippy routes will answer 503");
    }

    let elevenlabs = ElevenLabsClient::new(&config.elevenlabs)?;
    let issabel = IssabelClient::new(&config.issabel)?;
    let mm = MmClient::new(&config.mm)?;
    let llm = LlmClient::new(&config.llm)?;
    if !llm.is_configured() {
        warn!("LLM API key not set, the chatbot will send a canned reply");
    }

    let campaigns: PgCampaignService = CampaignService::new(
        Arc::new(PgScriptRepository::new(pool.clone())),
        Arc::new(PgCampaignRepository::new(pool.clone())),
        Arc::new(PgCallLogRepository::new(pool.clone())),
    );
    let chat: PgChatService = ChatService::new(
        Arc::new(PgChatMessageRepository::new(pool.clone())),
        Arc::new(llm),
        config.llm.system_prompt.clone(),
        config.llm.history_window,
    );

    let pool = web::Data::new(pool);
    let sippy = web::Data::new(sippy);
    let elevenlabs = web::Data::new(elevenlabs);
    let issabel = web::Data::new(issabel);
    let mm = web::Data::new(mm);
    let campaigns = web::Data::new(campaigns);
    let chat = web::Data::new(chat);

    let bind_addr = config.server_addr();
    let cors_origins = config.server.cors_origins.clone();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(sippy.clone())
            .app_data(elevenlabs.clone())
            .app_data(issabel.clone())
            .app_data(mm.clone())
            .app_data(campaigns.clone())
            .app_data(chat.clone())
            .app_data(web::JsonConfig::default().limit(1024 * 1024))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_query",
                        "message": error_message
                    })),
                )
                .into()
            }))
            .wrap(cors(&cors_origins))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .configure(velora_api::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
