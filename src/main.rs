mod api;
mod app;
mod config;
mod db;
mod http;
mod models;
mod ui;

use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::MemoryStore;
use crate::http::AppState;

/// Keep track of clients and prospects
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API server
    Serve {
        /// Keep records in memory instead of PostgreSQL; they are lost on exit
        #[arg(long)]
        in_memory: bool,
    },
    /// Run the terminal frontend against API_BASE_URL
    Tui,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init()?;

    match cli.command {
        Command::Serve { in_memory } => {
            init_tracing(None)?;
            serve(&config, in_memory).await
        }
        Command::Tui => {
            // Anything written to stderr would tear through the alternate screen
            let log_path = std::env::temp_dir().join("client_tracker_tui.log");
            let log_file = File::create(&log_path)
                .with_context(|| format!("cannot open log file {}", log_path.display()))?;
            init_tracing(Some(log_file))?;
            app::run(&config).await
        }
    }
}

fn init_tracing(log_file: Option<File>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match log_file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
        None => builder.try_init(),
    };
    result.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

async fn serve(config: &Config, in_memory: bool) -> Result<()> {
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    if in_memory {
        tracing::warn!("serving from memory; records will not survive a restart");
        return http::serve(listener, AppState::from_store(MemoryStore::new()), shutdown_signal())
            .await;
    }

    let database = db::init(config)
        .await
        .context("failed to connect to the database")?;
    tracing::info!("database connected and migrated");

    let result = http::serve(
        listener,
        AppState::from_store(database.clone()),
        shutdown_signal(),
    )
    .await;

    database.close().await;
    tracing::info!("database pool closed");
    result
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
