//! Recur CLI - Recurring expense detector
//!
//! Usage:
//!   recur detect --expenses FILE   Detect patterns and store new ones
//!   recur patterns                 List stored patterns
//!   recur confirm ID               Confirm a pattern
//!   recur upcoming --days 30       Show upcoming expenses

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let output = commands::Output { json: cli.json };

    match cli.command {
        Commands::Detect { expenses, dry_run } => {
            if dry_run {
                commands::cmd_detect_dry_run(&expenses, &config, output)
            } else {
                let store = commands::open_store(cli.data_dir.as_deref(), &config)?;
                commands::cmd_detect(&store, &expenses, &config, output)
            }
        }
        Commands::Patterns => {
            let store = commands::open_store(cli.data_dir.as_deref(), &config)?;
            commands::cmd_patterns_list(&store, output)
        }
        Commands::Confirm { pattern } => {
            let store = commands::open_store(cli.data_dir.as_deref(), &config)?;
            commands::cmd_confirm(&store, &pattern)
        }
        Commands::Dismiss { pattern } => {
            let store = commands::open_store(cli.data_dir.as_deref(), &config)?;
            commands::cmd_dismiss(&store, &pattern)
        }
        Commands::Advance { pattern, date } => {
            let store = commands::open_store(cli.data_dir.as_deref(), &config)?;
            commands::cmd_advance(&store, &pattern, date.as_deref())
        }
        Commands::Upcoming { days } => {
            let store = commands::open_store(cli.data_dir.as_deref(), &config)?;
            let today = chrono::Local::now().date_naive();
            commands::cmd_upcoming(&store, today, days, output)
        }
        Commands::Config => commands::cmd_config_show(&config),
    }
}
