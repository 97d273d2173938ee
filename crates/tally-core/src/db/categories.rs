//! Category storage: the open vocabulary and its usage counters

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{category_key, Category};

impl Database {
    /// List all categories, most used first (ties broken by name)
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, frequency FROM categories
            ORDER BY frequency DESC, name_key ASC
            "#,
        )?;

        let categories = stmt
            .query_map([], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// List the `limit` most used categories
    pub fn most_frequent_categories(&self, limit: i64) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, frequency FROM categories
            ORDER BY frequency DESC, name_key ASC
            LIMIT ?
            "#,
        )?;

        let categories = stmt
            .query_map(params![limit.max(0)], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Record one use of a category, creating it with frequency 1 if absent
    ///
    /// A single upsert statement, so concurrent increments of the same name
    /// cannot lose updates. Names are matched on their case-folded key; the
    /// stored spelling of an existing category is kept.
    pub fn increment_category_usage(&self, name: &str) -> Result<Category> {
        let conn = self.conn()?;
        let category = conn.query_row(
            r#"
            INSERT INTO categories (name, name_key, frequency) VALUES (?, ?, 1)
            ON CONFLICT(name_key) DO UPDATE SET frequency = frequency + 1
            RETURNING id, name, frequency
            "#,
            params![name.trim(), category_key(name)],
            Self::row_to_category,
        )?;

        Ok(category)
    }

    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            frequency: row.get(2)?,
        })
    }
}
