//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database setup (init) and shared utilities (open_db, date parsing)
//! - `expenses` - Add and list expenses
//! - `categories` - Category listing
//! - `categorize` - Batch categorization
//! - `serve` - Web server command

pub mod categories;
pub mod categorize;
pub mod core;
pub mod expenses;
pub mod serve;

// Re-export command functions for main.rs
pub use categories::*;
pub use categorize::*;
pub use core::*;
pub use expenses::*;
pub use serve::*;

/// Shorten `s` to at most `max` characters, marking the cut with "..."
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
