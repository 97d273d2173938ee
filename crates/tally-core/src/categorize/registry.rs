//! Category registry
//!
//! The single source of truth for which categories exist and how often each
//! has been used. All frequency changes go through here.

use tracing::debug;

use super::CategoryStore;
use crate::error::Result;
use crate::models::Category;

/// Open category vocabulary ranked by usage
pub struct CategoryRegistry<'a> {
    store: &'a dyn CategoryStore,
}

impl<'a> CategoryRegistry<'a> {
    pub fn new(store: &'a dyn CategoryStore) -> Self {
        Self { store }
    }

    /// All categories, most used first, ties by name
    pub fn get_all(&self) -> Result<Vec<Category>> {
        self.store.list_categories()
    }

    /// Category names in ranking order (the known set)
    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self.get_all()?.into_iter().map(|c| c.name).collect())
    }

    /// Record one use of `name`, creating the category if needed
    pub fn increment_usage(&self, name: &str) -> Result<Category> {
        let category = self.store.increment_category_usage(name)?;
        debug!(
            category = %category.name,
            frequency = category.frequency,
            "Category usage incremented"
        );
        Ok(category)
    }

    /// The `limit` most used categories
    pub fn get_most_frequent(&self, limit: i64) -> Result<Vec<Category>> {
        self.store.most_frequent_categories(limit)
    }
}
