//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Recur - Find the subscriptions hiding in your expenses
#[derive(Parser)]
#[command(name = "recur")]
#[command(about = "Recurring expense detector", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory for the pattern store
    ///
    /// Defaults to ~/.local/share/recur (or the platform equivalent).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Detection config file (TOML)
    ///
    /// Defaults to <data-dir>/config/detection.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect recurring patterns in an expense history
    Detect {
        /// Expense file (.csv or .json)
        #[arg(short, long)]
        expenses: PathBuf,

        /// Show detected patterns without storing them
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored patterns
    Patterns,

    /// Confirm a detected pattern
    Confirm {
        /// Pattern id, unique id prefix, or exact description
        pattern: String,
    },

    /// Dismiss (delete) a pattern
    Dismiss {
        /// Pattern id, unique id prefix, or exact description
        pattern: String,
    },

    /// Record a new expense for a pattern and move its next expected date
    Advance {
        /// Pattern id, unique id prefix, or exact description
        pattern: String,

        /// Date of the new expense (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show upcoming expenses from confirmed patterns
    Upcoming {
        /// Only show expenses due within this many days (overdue always shown)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Show the effective detection config
    Config,
}
