//! thinmusic-ui - ThinMusic front-end service
//!
//! Serves the search panel, playback queue and session state over HTTP + SSE,
//! backed by the streaming service's search API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use thinmusic_common::config::{self, ConfigOverrides, ServiceConfig};
use thinmusic_common::events::EventBus;
use thinmusic_ui::playback::MemoryQueue;
use thinmusic_ui::search::DispatcherSettings;
use thinmusic_ui::services::{MemoryProfileStore, MusicApiClient, SearchScope};
use thinmusic_ui::{build_router, logging, AppState};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for thinmusic-ui
#[derive(Parser, Debug)]
#[command(name = "thinmusic-ui")]
#[command(about = "ThinMusic front-end service")]
#[command(version)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = "THINMUSIC_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "THINMUSIC_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "THINMUSIC_PORT")]
    port: Option<u16>,

    /// Base URL of the streaming service API
    #[arg(long, env = "THINMUSIC_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Catalog storefront (country code)
    #[arg(long, env = "THINMUSIC_STOREFRONT")]
    storefront: Option<String>,

    /// Developer token for the streaming service API
    #[arg(long, env = "THINMUSIC_DEVELOPER_TOKEN", hide_env_values = true)]
    developer_token: Option<String>,

    /// User token for library access
    #[arg(long, env = "THINMUSIC_MUSIC_USER_TOKEN", hide_env_values = true)]
    music_user_token: Option<String>,

    /// Quiet period before a search is sent, in milliseconds
    #[arg(long, env = "THINMUSIC_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    /// Results requested from each search endpoint
    #[arg(long, env = "THINMUSIC_SEARCH_LIMIT")]
    search_limit: Option<u32>,

    /// Log level filter
    #[arg(long, env = "THINMUSIC_LOG_LEVEL")]
    log_level: Option<String>,

    /// User already signed in with the auth provider
    #[arg(long, env = "THINMUSIC_USER")]
    user: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            api_base_url: self.api_base_url.clone(),
            storefront: self.storefront.clone(),
            developer_token: self.developer_token.clone(),
            music_user_token: self.music_user_token.clone(),
            debounce_ms: self.debounce_ms,
            search_limit: self.search_limit,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Before config loading so its warnings are visible
    let log = logging::init(
        args.log_level
            .as_deref()
            .unwrap_or(config::DEFAULT_LOG_LEVEL),
    );

    let config_path = config::config_file_path(args.config.as_deref());
    let toml_config = match &config_path {
        Some(path) => config::load_toml_config(path)?,
        None => Default::default(),
    };
    let config = ServiceConfig::resolve(&args.overrides(), &toml_config)?;
    log.apply_level(&config.log_level)?;

    info!("Starting ThinMusic UI v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config directory available, using defaults"),
    }
    if config.developer_token.is_none() {
        info!("No developer token configured; searches will return no results");
    }

    let client = Arc::new(MusicApiClient::new(&config).context("Failed to build HTTP client")?);
    let events = EventBus::new(1000);
    let state = AppState::new(
        Arc::new(client.scoped(SearchScope::Catalog)),
        Arc::new(client.scoped(SearchScope::Library)),
        Arc::new(MemoryQueue::new()),
        Arc::new(MemoryProfileStore::new()),
        DispatcherSettings {
            debounce: config.debounce,
            search_limit: config.search_limit,
        },
        events,
    );

    state
        .session
        .provider_reported(args.user.as_deref())
        .await
        .context("Failed to restore session")?;

    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read bound address")?;
    info!("thinmusic-ui listening on http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
