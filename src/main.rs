//! Asset-Search server entry point

use anyhow::{Context, Result};
use asset_search::{
    config::{self, Settings, SettingsSource},
    llm::AnthropicClient,
    web::{create_router, AppState},
};
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "asset-search.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let (settings, source) = config::load()?;

    // Initialize logging
    init_tracing(&settings)?;

    info!("Starting Asset-Search v{}", asset_search::VERSION);
    match source {
        SettingsSource::File(path) => info!("Loaded settings from: {}", path.display()),
        SettingsSource::Defaults => info!("No settings file found, using defaults"),
    }
    if settings.anthropic.api_key.trim().is_empty() {
        warn!("ANTHROPIC_API_KEY is not set; every website search will come back empty");
    }
    info!(
        "Searching {} target websites with model {}",
        settings.search.target_websites.len(),
        settings.anthropic.model
    );

    // Initialize model client
    let client = AnthropicClient::with_settings(&settings.anthropic)?;

    // Create application state
    let state = AppState::new(settings.clone(), Arc::new(client))?;
    info!(
        "Storing search records under {}",
        settings.storage.data_dir.display()
    );

    // Create router
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Log to stdout and, as JSON lines, to `<logs_dir>/asset-search.log`
fn init_tracing(settings: &Settings) -> Result<()> {
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "asset_search={level},tower_http={level}",
            level = default_level
        ))
    });

    std::fs::create_dir_all(&settings.storage.logs_dir).with_context(|| {
        format!(
            "failed to create log directory {}",
            settings.storage.logs_dir.display()
        )
    })?;
    let log_path = settings.storage.logs_dir.join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    Ok(())
}
