//! CLI command definitions and dispatch for the `mflow` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod status;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Serve a scripted, menu-based conversation flow.
#[derive(Parser)]
#[command(name = "mflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Flow YAML file to serve (overrides config.toml).
        #[arg(short, long)]
        flow: Option<PathBuf>,

        /// Port to listen on (overrides config.toml; default 3000).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config.toml; default 127.0.0.1).
        #[arg(long)]
        host: Option<String>,

        /// SQLite database URL for the session log.
        #[arg(long)]
        database_url: Option<String>,

        /// Disable session log persistence.
        #[arg(long)]
        no_persist: bool,
    },

    /// Validate a flow file and print its step table.
    Validate {
        /// Flow YAML file to validate.
        flow: PathBuf,
    },

    /// Chat with a flow interactively on the terminal.
    Chat {
        /// Flow YAML file to chat with.
        flow: PathBuf,

        /// User identifier for the session.
        #[arg(short, long, default_value = "local")]
        user: String,
    },

    /// Show session log statistics.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
