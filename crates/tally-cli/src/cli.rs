//! CLI argument definitions using clap
//!
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track expenses and categorize them automatically
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Expense tracker with automatic categorization", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Record an expense
    Add {
        /// What the money was spent on
        #[arg(short, long)]
        description: String,

        /// Amount spent
        #[arg(short, long, allow_hyphen_values = true)]
        amount: f64,

        /// Category (leave empty to categorize later)
        #[arg(short, long)]
        category: Option<String>,

        /// Expense date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List expenses
    List {
        /// Only show one month (YYYY-MM), with a per-category summary
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List categories by usage
    Categories {
        /// Show only the most used N categories
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Assign categories to expenses
    Categorize {
        /// Expense IDs to categorize
        ids: Vec<i64>,

        /// Categorize every expense that has no category
        #[arg(long)]
        uncategorized: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to $PORT, then 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
