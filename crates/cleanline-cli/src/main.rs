//! Cleanline CLI - Main entry point

use cleanline_cli::{Cli, Commands, RuleConfigCommand};
use cleanline_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    let log_config = if cli.verbose {
        LogConfig::builder().level(LogLevel::Debug).output(LogOutput::Console).log_file_prefix("cleanline-cli".to_string()).build()
    } else {
        LogConfig::builder().level(LogLevel::Warn).output(LogOutput::Console).log_file_prefix("cleanline-cli".to_string()).build()
    };
    let log_config = LogConfig::from_env().unwrap_or(log_config);
    let _ = init_logging(&log_config);

    let result = execute_command(&cli).await;

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> cleanline_cli::Result<()> {
    let Some(ref command) = cli.command else {
        unreachable!("command presence is checked in main");
    };

    match command {
        Commands::Upload { file } => cleanline_cli::commands::upload::run(cli.server_url.clone(), file.clone()).await,

        Commands::Status { job_id } => cleanline_cli::commands::status::run(cli.server_url.clone(), *job_id).await,

        Commands::RuleConfig { command } => match command {
            RuleConfigCommand::Show => cleanline_cli::commands::rule_config::show(cli.server_url.clone()).await,
            RuleConfigCommand::Update { path } => {
                cleanline_cli::commands::rule_config::update(cli.server_url.clone(), path.clone()).await
            }
            RuleConfigCommand::Reload { path } => {
                cleanline_cli::commands::rule_config::reload(cli.server_url.clone(), path.clone()).await
            }
        },
    }
}
