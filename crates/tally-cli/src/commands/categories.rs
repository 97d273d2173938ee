//! Category commands

use anyhow::{bail, Result};
use tally_core::categorize::CategoryRegistry;
use tally_core::db::Database;

pub fn cmd_categories(db: &Database, limit: Option<i64>) -> Result<()> {
    let registry = CategoryRegistry::new(db);
    let categories = match limit {
        Some(n) if n < 0 => bail!("--limit must not be negative"),
        Some(n) => registry.get_most_frequent(n)?,
        None => registry.get_all()?,
    };

    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    println!("{:24} {:>6}", "Category", "Uses");
    println!("{}", "-".repeat(31));
    for c in &categories {
        println!("{:24} {:>6}", c.name, c.frequency);
    }

    Ok(())
}
