//! Cleanline CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Operator CLI for a running Cleanline server:
//!
//! - **Upload**: submit a file for cleaning (`cleanline upload <file>`)
//! - **Status**: poll a job's progress and terminal statistics (`cleanline status <job-id>`)
//! - **Rule configuration**: inspect, replace, and hot-reload the active rule set (`cleanline rule-config ...`)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod progress;

pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Cleanline - operator CLI for the data cleaning service
#[derive(Parser, Debug)]
#[command(name = "cleanline")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL
    #[arg(long, env = "CLEANLINE_SERVER_URL", default_value = "http://localhost:8000", global = true)]
    pub server_url: String,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a file for cleaning
    Upload {
        /// Path to the XLSX/XLS/CSV file to upload
        file: String,
    },

    /// Check a job's status and progress
    Status {
        /// Job id returned by `cleanline upload`
        job_id: Uuid,
    },

    /// Inspect or change the active rule configuration
    RuleConfig {
        #[command(subcommand)]
        command: RuleConfigCommand,
    },
}

/// Rule configuration subcommands
#[derive(Subcommand, Debug)]
pub enum RuleConfigCommand {
    /// Print the currently active rule configuration
    Show,

    /// Replace the active rule configuration with a local JSON file
    Update {
        /// Path to a JSON file containing a `RuleConfiguration`
        path: String,
    },

    /// Ask the server to reload its rule configuration from disk
    Reload {
        /// Optional path on the server's filesystem; defaults to the
        /// server's configured rule configuration file
        #[arg(long)]
        path: Option<String>,
    },
}
