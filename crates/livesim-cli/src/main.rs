//! livesim - Main entry point

use clap::Parser;
use colored::Colorize;
use livesim_cli::config::log_config;
use livesim_cli::{Cli, CliError, Commands};
use livesim_common::logging::init_logging;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Load .env before clap reads its env fallbacks
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let logging = match log_config(cli.verbose, |name| std::env::var(name).ok()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    // The CLI still works without logging
    let guard = init_logging(&logging).ok();

    let code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{} {}", "Error:".red().bold(), e);
            e.exit_code()
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(code);
}

fn fail(e: &CliError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), e);
    process::exit(e.exit_code());
}

/// Execute the CLI command, returning the process exit code
async fn execute_command(cli: &Cli) -> livesim_cli::Result<i32> {
    match &cli.command {
        Commands::Run(args) => livesim_cli::commands::run::run(args).await,
        Commands::Inspect { input } => {
            livesim_cli::commands::inspect::run(input).await?;
            Ok(0)
        }
    }
}
