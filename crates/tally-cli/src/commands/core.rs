//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - Date and month argument parsing

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tally_core::db::Database;

/// Default port for `serve` when neither --port nor $PORT is set
pub const DEFAULT_PORT: u16 = 3000;

/// Open (creating if needed) the database
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let categories = db.list_categories().context("Failed to read categories")?;
    println!("   {} categories available", categories.len());

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add an expense: tally add -d \"Lunch\" -a 12.50");
    println!("  2. Categorize it:  tally categorize --uncategorized");
    println!("  3. Start web UI:   tally serve");

    Ok(())
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parse a YYYY-MM month into (year, month)
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let Some((year, month)) = s.trim().split_once('-') else {
        bail!("Invalid month '{}', expected YYYY-MM", s);
    };
    let year: i32 = year
        .parse()
        .with_context(|| format!("Invalid year in '{}'", s))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("Invalid month in '{}'", s))?;
    if !(1..=12).contains(&month) {
        bail!("Invalid month '{}', month must be 01-12", s);
    }
    Ok((year, month))
}

/// Pick the server port: --port, then $PORT, then the default
pub fn resolve_port(flag: Option<u16>, env: Option<&str>) -> Result<u16> {
    if let Some(port) = flag {
        return Ok(port);
    }
    match env.map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid PORT '{}'", raw)),
        None => Ok(DEFAULT_PORT),
    }
}
