//! Domain models for Tally

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Categories seeded into a fresh database
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Food",
    "Transportation",
    "Housing",
    "Entertainment",
    "Healthcare",
    "Utilities",
    "Shopping",
    "Education",
];

/// Case-folded form of a category name; two names are the same category
/// when their keys are equal
pub fn category_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether `a` and `b` name the same category
pub fn same_category(a: &str, b: &str) -> bool {
    category_key(a) == category_key(b)
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    /// User-chosen or inferred spending category
    pub category: Option<String>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Data for creating an expense
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    pub expense_date: NaiveDate,
}

/// Partial update for an expense; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expense_date: Option<NaiveDate>,
}

/// A spending category with its usage counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub frequency: i64,
}

/// Per-category totals for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// `None` groups uncategorized expenses
    pub category: Option<String>,
    pub total_amount: f64,
    pub transaction_count: i64,
}

/// Which classifier produced a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    /// Language-model provider
    Semantic,
    /// Local keyword tables
    Keyword,
}

impl CategorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
        }
    }
}

impl std::fmt::Display for CategorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of categorizing one expense in a batch
///
/// Serializes as `{"id", "status": "success", "previousCategory", "newCategory"}`
/// or `{"id", "status": "error", "message"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub id: i64,
    #[serde(flatten)]
    pub result: OutcomeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeResult {
    #[serde(rename_all = "camelCase")]
    Success {
        /// Category before this run, `"None"` when the expense had none
        previous_category: String,
        new_category: String,
    },
    Error { message: String },
}

impl ClassificationOutcome {
    pub fn success(id: i64, previous_category: Option<&str>, new_category: &str) -> Self {
        Self {
            id,
            result: OutcomeResult::Success {
                previous_category: previous_category.unwrap_or("None").to_string(),
                new_category: new_category.to_string(),
            },
        }
    }

    pub fn error(id: i64, message: &str) -> Self {
        Self {
            id,
            result: OutcomeResult::Error {
                message: message.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, OutcomeResult::Success { .. })
    }

    /// The assigned category, if this item succeeded
    pub fn new_category(&self) -> Option<&str> {
        match &self.result {
            OutcomeResult::Success { new_category, .. } => Some(new_category),
            OutcomeResult::Error { .. } => None,
        }
    }
}
