//! Connect Four - Unified CLI
//!
//! Relay server, terminal client and console play in one binary.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use connect_four::{AppConfig, console::ConsoleGame, serve};
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Server {
            host,
            port,
            turn_timeout,
            config,
        } => run_server(&config, host, port, turn_timeout).await,
        Command::Client { host, port, config } => run_client(&config, host, port).await,
        Command::Console { mode } => run_console(mode),
    }
}

/// Run the relay server until Ctrl-C
#[instrument(skip_all, fields(config_path = %config_path.display()))]
async fn run_server(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    turn_timeout: Option<u64>,
) -> Result<()> {
    initialize_tracing("info,connect_four=debug");

    let config = AppConfig::load_or_default(config_path)?
        .server()
        .clone()
        .with_overrides(host, port, turn_timeout);
    config.validate()?;

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %config.bind_address(),
        turn_timeout = ?config.turn_timeout(),
        "Starting Connect Four relay server"
    );

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let reports = serve(listener, config.turn_timeout(), shutdown).await?;
    info!(sessions = reports.len(), "Server exited");
    Ok(())
}

/// Run the terminal client
async fn run_client(config_path: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = AppConfig::load_or_default(config_path)?
        .client()
        .clone()
        .with_overrides(host, port);
    config.validate()?;

    tui::run_tui(config.server_address()).await
}

/// Run local console play on stdin/stdout
fn run_console(mode: Option<connect_four::console::Mode>) -> Result<()> {
    // Keep diagnostics quiet so they do not interleave with the game text
    initialize_tracing("warn");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut game = ConsoleGame::new(stdin.lock(), stdout.lock());
    game.run(mode)
}

#[instrument]
fn initialize_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Tracing initialized");
}
