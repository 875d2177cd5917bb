// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! # radvd fleet CLI
//!
//! The `rafleet` binary is both the per-router agent and the operator's
//! fleet tool.
//!
//! ## Commands
//!
//! - `rafleet serve` - run the per-router agent (HTTP API over radvd)
//! - `rafleet policy validate|compile` - work with policy files offline
//! - `rafleet fleet apply|update|status|teardown` - drive a fleet of agents

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::{fleet::FleetCommand, policy::PolicyCommand, serve::ServeArgs};

/// radvd fleet manager - policy-driven router advertisements
#[derive(Parser)]
#[command(name = "rafleet")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RAFLEET_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the per-router agent
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Policy file operations
    #[command(name = "policy")]
    Policy {
        #[command(subcommand)]
        command: PolicyCommand,
    },

    /// Fleet-wide operations against running agents
    #[command(name = "fleet")]
    Fleet {
        #[command(subcommand)]
        command: FleetCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Policy { command } => commands::policy::handle_command(command).await,
        Commands::Fleet { command } => commands::fleet::handle_command(command).await,
    };

    if let Err(err) = &result {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
