//! Command-line interface definitions (AMBIENT.4).

pub mod check;
pub mod output;
pub mod run;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// marketwatch - read-only ingestion and signal pipeline for a prediction-market venue.
#[derive(Parser, Debug)]
#[command(name = "marketwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler and websocket consumer in the foreground
    Run(RunArgs),

    /// Print the last-run status of every registered job
    Status,

    /// Validate configuration and upstream connectivity without starting anything
    #[command(subcommand)]
    Check(CheckCommands),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,

    /// Run every fetch and signal job, but never dispatch alerts
    #[arg(long)]
    pub no_alerts: bool,
}

#[derive(Subcommand, Debug)]
pub enum CheckCommands {
    /// Validate the configuration file and required credentials
    Config,
    /// Test REST and websocket connectivity to the upstream venue
    Connection,
    /// Send a test message through the Telegram alert channel
    Telegram,
    /// Send a test message through the Slack alert channel
    Slack,
}
