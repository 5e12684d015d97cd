pub mod api;
pub mod clerk; // Terminal clerking client
pub mod config;
pub mod local_store;
pub mod location;
pub mod mail;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod trials;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::types::ApiContext;
use crate::config::{AppConfig, ConfigError};
use crate::mail::{HttpMailer, MailError, Mailer, TracingMailer};
use crate::pipeline::llm::{GeminiClient, LlmError};
use crate::pipeline::simulation::SimulationEngine;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("{0}")]
    Server(String),
}

/// Initialize tracing (`RUST_LOG` overrides the default filter).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Build the simulation engine against the configured Gemini endpoint.
pub fn build_engine(config: &AppConfig) -> Result<SimulationEngine, StartupError> {
    let client = GeminiClient::new(
        &config.gemini_url,
        config.require_api_key()?,
        config.timeout_secs,
    )?;
    Ok(SimulationEngine::new(Arc::new(client), &config.model))
}

fn build_mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>, StartupError> {
    match &config.mail {
        Some(mail) => Ok(Arc::new(HttpMailer::new(mail)?)),
        None => {
            tracing::warn!("CLERKLY_MAIL_URL not set, report emails will only be logged");
            Ok(Arc::new(TracingMailer))
        }
    }
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(config: AppConfig) -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", crate::config::APP_NAME, crate::config::APP_VERSION);

    let ctx = ApiContext::new(build_engine(&config)?, build_mailer(&config)?);
    let mut server = api::server::start_server_on(ctx, config.bind)
        .await
        .map_err(StartupError::Server)?;

    tracing::info!(addr = %server.addr, model = %config.model, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    server.shutdown();
    server.wait().await;
    Ok(())
}
