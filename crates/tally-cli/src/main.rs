//! Tally CLI - Expense tracker with automatic categorization
//!
//! Usage:
//!   tally init                          Initialize database
//!   tally add -d "Lunch" -a 12.50       Record an expense
//!   tally categorize --uncategorized    Categorize expenses without a category
//!   tally serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
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

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Add {
            description,
            amount,
            category,
            date,
        } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_add(
                &db,
                &description,
                amount,
                category.as_deref(),
                date.as_deref(),
            )
            .map(|_| ())
        }
        Commands::List { month } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_list(&db, month.as_deref())
        }
        Commands::Categories { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_categories(&db, limit)
        }
        Commands::Categorize { ids, uncategorized } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_categorize(&db, &ids, uncategorized)
                .await
                .map(|_| ())
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            let port = commands::resolve_port(port, std::env::var("PORT").ok().as_deref())?;
            commands::cmd_serve(&cli.db, &host, port, static_dir.as_deref()).await
        }
    }
}
