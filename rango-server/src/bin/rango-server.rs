/// Rango HTTP Server Binary
///
/// Serves a Rango directory over HTTP, flushing changes to the snapshot file
/// periodically and once more on shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use rango_core::{Directory, DirectoryConfig};
use rango_server::{build_router, AppState, ServerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rango-server")]
#[command(about = "Rango web directory server", long_about = None)]
struct Args {
    /// Path to the directory snapshot file (omit for an in-memory directory)
    #[arg(short, long, value_name = "PATH")]
    db_path: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Seconds between snapshot flushes
    #[arg(long, default_value = "5")]
    flush_interval: u64,

    /// Maximum number of visitor sessions kept (0 = unlimited)
    #[arg(long, default_value = "10000")]
    max_sessions: usize,

    /// Maximum likes/additions per second across all clients (0 = unlimited)
    #[arg(long, default_value = "0")]
    mutation_rps: u32,

    /// Maximum number of category suggestions returned
    #[arg(long, default_value = "8")]
    max_suggestions: usize,

    /// Seed the directory with sample categories and pages on startup
    #[arg(long)]
    populate: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let directory = DirectoryConfig::new().with_max_suggestions(self.max_suggestions);
        let config = ServerConfig::new()
            .with_max_sessions(self.max_sessions)
            .with_mutation_rps(self.mutation_rps)
            .with_directory(directory);

        ServerConfig {
            host: self.host,
            port: self.port,
            db_path: self.db_path,
            flush_interval: Duration::from_secs(self.flush_interval),
            ..config
        }
    }
}

/// Run one flush on the blocking thread pool
async fn flush_in_background(directory: Directory) {
    match tokio::task::spawn_blocking(move || directory.flush()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => error!("Failed to flush directory: {}", e),
        Err(e) => error!("Flush task join error: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Default to info level, can override with RUST_LOG env var
    // Example: RUST_LOG=rango_server=debug cargo run --bin rango-server
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let args = Args::parse();
    let populate = args.populate;
    let config = args.into_config();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid server configuration")?;

    let directory = match &config.db_path {
        Some(path) => {
            info!("Opening directory at {:?}", path);
            Directory::open_or_create(path, config.directory.clone())
                .context("Failed to open directory")?
        }
        None => {
            warn!("No --db-path given, directory will not be persisted");
            Directory::in_memory(config.directory.clone())?
        }
    };

    if populate {
        let report = directory.populate().context("Failed to populate directory")?;
        info!(
            "Seeded {} categories and {} pages",
            report.categories_added, report.pages_added
        );
    }

    // Periodic snapshot flush
    let flusher = directory.clone();
    let flush_interval = config.flush_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(flush_interval);
        loop {
            ticker.tick().await;
            flush_in_background(flusher.clone()).await;
        }
    });

    let addr = config.bind_addr().map_err(anyhow::Error::msg)?;
    let state = AppState::new(directory.clone(), config);

    if state.rate_limiter.is_enabled() {
        info!("Mutating endpoints limited to {} requests/s", state.config.mutation_rps);
    } else {
        info!("Rate limiting disabled");
    }
    match state.sessions.max_sessions() {
        0 => info!("Visitor sessions unbounded"),
        max => info!("Keeping up to {} visitor sessions", max),
    }
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Rango listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tokio::task::spawn_blocking(move || directory.flush())
        .await
        .context("Flush task failed")?
        .context("Failed to flush directory on shutdown")?;
    info!("Directory flushed, exiting");

    Ok(())
}
