//! Jukebox Bot - Main entry point
//!
//! Runs the bot against the console chat transport and the simulated
//! playback backend, resolving queries from a TOML catalog.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use jukebox_bot::backend::SimulatedBackend;
use jukebox_bot::bot::{self, Session};
use jukebox_bot::chat::ConsoleChat;
use jukebox_bot::resolver::{Catalog, CatalogResolver};
use jukebox_common::config::{load_config, CONFIG_ENV_VAR};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for jukebox-bot
#[derive(Parser, Debug)]
#[command(name = "jukebox-bot")]
#[command(about = "Chat-driven music queue")]
#[command(version)]
struct Args {
    /// Configuration file (overrides JUKEBOX_CONFIG and the platform default)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Track catalog to resolve queries against
    #[arg(long, env = "JUKEBOX_CATALOG")]
    catalog: Option<PathBuf>,

    /// Playback length for catalog tracks without a duration
    #[arg(long, default_value = "30")]
    track_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_path) =
        load_config(args.config.as_deref(), CONFIG_ENV_VAR).context("Failed to load configuration")?;

    // Initialize tracing
    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("jukebox_bot={level},jukebox_common={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting jukebox-bot v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("Configuration: compiled defaults"),
    }

    let catalog_path = args
        .catalog
        .or_else(|| config.catalog_path.clone())
        .ok_or_else(|| anyhow!("No catalog given; use --catalog or set catalog_path in the config file"))?;
    let catalog = Catalog::from_file(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
    info!("Catalog {} loaded ({} tracks)", catalog_path.display(), catalog.track_count());

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let backend = Arc::new(SimulatedBackend::new(events_tx, Duration::from_secs(args.track_seconds)));
    let (chat, incoming) = ConsoleChat::start(config.initial_volume, shutdown.clone());

    let session = Session {
        backend,
        backend_events: events_rx,
        chat,
        incoming,
        resolver: Arc::new(CatalogResolver::new(catalog)),
    };

    if let Err(e) = bot::run(&config, session, shutdown).await {
        error!("Jukebox stopped: {}", e);
        std::process::exit(1);
    }

    info!("Shutdown complete");
    // The console reader may still be parked in a blocking stdin read
    std::process::exit(0)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
