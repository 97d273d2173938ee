//! Expense categorization engine
//!
//! - `CategoryRegistry` - the open category vocabulary, ranked by usage
//! - `KeywordClassifier` - deterministic keyword-table fallback
//! - `SemanticClassifier` - language-model classifier via an `AIClient`
//! - `CategoryResolver` - semantic first, keyword fallback, vocabulary check
//! - `BatchCategorizer` - categorizes a list of expenses with per-item outcomes
//!
//! The engine reads and writes through the `ExpenseStore` and `CategoryStore`
//! traits, both implemented by [`Database`].

mod batch;
mod keyword;
mod registry;
mod resolver;
mod semantic;

pub use batch::BatchCategorizer;
pub use keyword::KeywordClassifier;
pub use registry::CategoryRegistry;
pub use resolver::{CategoryResolver, Resolution};
pub use semantic::SemanticClassifier;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Category, CategorySource, Expense};

/// A strategy that picks one of the known categories for a description
#[async_trait]
pub trait Classifier: Send + Sync {
    /// `Ok(None)` means the classifier declined
    async fn classify(&self, description: &str, categories: &[String]) -> Result<Option<String>>;

    /// Which tier this classifier is, for logging
    fn source(&self) -> CategorySource;
}

/// Expense persistence used by the batch categorizer
pub trait ExpenseStore: Send + Sync {
    fn get_expense(&self, id: i64) -> Result<Option<Expense>>;

    fn update_expense(
        &self,
        id: i64,
        description: &str,
        amount: f64,
        category: Option<&str>,
        expense_date: NaiveDate,
    ) -> Result<Expense>;
}

/// Category persistence behind the registry
pub trait CategoryStore: Send + Sync {
    /// All categories, most used first
    fn list_categories(&self) -> Result<Vec<Category>>;

    /// Create with frequency 1 or add one, atomically
    fn increment_category_usage(&self, name: &str) -> Result<Category>;

    fn most_frequent_categories(&self, limit: i64) -> Result<Vec<Category>>;
}

impl ExpenseStore for Database {
    fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        Database::get_expense(self, id)
    }

    fn update_expense(
        &self,
        id: i64,
        description: &str,
        amount: f64,
        category: Option<&str>,
        expense_date: NaiveDate,
    ) -> Result<Expense> {
        Database::update_expense(self, id, description, amount, category, expense_date)
    }
}

impl CategoryStore for Database {
    fn list_categories(&self) -> Result<Vec<Category>> {
        Database::list_categories(self)
    }

    fn increment_category_usage(&self, name: &str) -> Result<Category> {
        Database::increment_category_usage(self, name)
    }

    fn most_frequent_categories(&self, limit: i64) -> Result<Vec<Category>> {
        Database::most_frequent_categories(self, limit)
    }
}
