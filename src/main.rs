//! Clicker Server
//!
//! Run with: cargo run -- [--config config.toml] [--port 3000]
//!
//! # Configuration
//!
//! Settings come from a TOML file (see `clicker-server print-config`),
//! then environment variables, then command-line flags:
//! - `PORT`: Port to listen on (default: 3000)
//! - `CLICKER_HOST`: Host to bind to (default: 0.0.0.0)
//! - `CLICKER_DATA_DIR`: Directory holding the user list (default: data)
//! - `CLICKER_STATIC_DIR`: Directory with the game pages (default: public)
//! - `CLICKER_STREAM_INTERVAL_SECS`: Seconds between stream events (default: 5)
//! - `RUST_LOG`: Log filter (default: the configured level)

use anyhow::Context;
use clap::{Parser, Subcommand};
use clicker_server::api::{serve, AppState};
use clicker_server::config::{generate_default_config, Config, LoggingConfig};
use clicker_server::storage::PlayerStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clicker-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Player-count backend for the clicker game")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the user list
    #[arg(long)]
    data_dir: Option<String>,

    /// Directory with the game pages
    #[arg(long)]
    static_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a default config file and exit
    PrintConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::PrintConfig) = cli.command {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let (mut config, warnings) = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };

    if let Some(port) = cli.port {
        config.api.port = port;
    }
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if let Some(dir) = cli.static_dir {
        config.api.static_dir = dir;
    }

    init_logging(&config.logging)?;
    for warning in warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("Starting clicker server v{}", env!("CARGO_PKG_VERSION"));

    let storage_config = config.storage.to_runtime();
    let api_config = config.api.to_runtime();
    let stream_config = config.api.stream_config();

    tracing::info!("Data file: {:?}", storage_config.file_path());
    tracing::info!("Static directory: {:?}", api_config.static_dir);
    tracing::info!("Stream interval: {:?}", stream_config.interval);

    // Directory and load failures are logged inside; the server starts regardless
    let store = Arc::new(PlayerStore::open(storage_config).await);
    tracing::info!(users = store.len().await, "Player store ready");

    let state =
        AppState::with_stream_config(Arc::clone(&store), api_config.clone(), stream_config);
    serve(state, &api_config).await?;

    if let Err(e) = store.save().await {
        tracing::error!(error = %e, "Failed to save user list on shutdown");
    }
    tracing::info!("Clicker server stopped");

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("clicker_server={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    Ok(())
}
