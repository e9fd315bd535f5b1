//! Volto-RSS-RS: RSS and Atom feeds for Volto listing blocks
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use volto_rss_rs::{
    config,
    network::HttpClient,
    web::{create_router, AppState},
};

/// Command line options
#[derive(Debug, Parser)]
#[command(name = "volto-rss-rs", version, about)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "RSS_FEED_SETTINGS_PATH")]
    config: Option<PathBuf>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    info!("Starting Volto-RSS-RS v{}", volto_rss_rs::VERSION);

    // Load configuration
    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(bind) = cli.bind {
        settings.server.bind_address = bind;
    }
    info!(
        api = %settings.api.base_path(),
        format = ?settings.feed.format,
        "Loaded configuration"
    );

    let client = HttpClient::with_settings(&settings.outgoing)?;

    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    let shutdown = CancellationToken::new();
    let state = AppState::with_shutdown(settings, client, shutdown.clone());
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Resolves on Ctrl-C after cancelling every in-flight request
async fn shutdown_signal(shutdown: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
    shutdown.cancel();
}
