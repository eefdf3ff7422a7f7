//! # Dockhand Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the Dockhand CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Loading configuration (the engine is connected when a command first needs it)
//! - Turning Ctrl+C / SIGTERM into cancellation of in-flight pulls and sessions
//! - Routing execution to the appropriate command handler
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! dockhand --help
//!
//! # Bring up a preset with increased verbosity
//! dockhand -vv up demo1
//!
//! # Where did port 80 end up?
//! dockhand port demo1 80
//! ```
//!
use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Subcommand argument structs and handlers
mod common; // Container lifecycle core
mod core; // Errors and configuration

use crate::commands::CommandContext;

#[derive(Parser, Debug)]
#[command(
    name = "dockhand",
    about = "Idempotent container lifecycle management for local workflows",
    long_about = "Brings named containers into the running state, tears them down\n\
                  regardless of their current state, and reports mapped ports.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    Up(commands::up::UpArgs),
    #[command(alias = "rm")]
    Down(commands::down::DownArgs),
    #[command(alias = "ps")]
    Status(commands::status::StatusArgs),
    Port(commands::port::PortArgs),
    Script(commands::script::ScriptArgs),
}

/// Resolves when Ctrl+C or (on Unix) SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, cancelling...");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, cancelling...");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::core::config::load_config().context("Failed to load Dockhand configuration")?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });

    let ctx = CommandContext::new(config, cancel);
    match cli.command {
        Commands::Up(args) => commands::up::handle_up(args, &ctx).await,
        Commands::Down(args) => commands::down::handle_down(args, &ctx).await,
        Commands::Status(args) => commands::status::handle_status(args, &ctx).await,
        Commands::Port(args) => commands::port::handle_port(args, &ctx).await,
        Commands::Script(args) => commands::script::handle_script(args, &ctx).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
