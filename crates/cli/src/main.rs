mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    pulse_core::load_dotenv();
    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    config.log_summary();

    let code = match cli.command {
        Command::Discover(args) => commands::discover::run(args, &config).await?,
        Command::Validate(args) => commands::validate::run(args)?,
        Command::Stats(args) => commands::stats::run(args)?,
        Command::Schema(args) => commands::schema::run(args)?,
    };
    Ok(ExitCode::from(code))
}
