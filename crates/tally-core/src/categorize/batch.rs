//! Batch categorization
//!
//! Items are processed one at a time, in input order. A failing item yields
//! an error outcome and the batch moves on.

use tracing::{debug, info, warn};

use super::{CategoryRegistry, CategoryResolver, CategoryStore, ExpenseStore};
use crate::error::{Error, Result};
use crate::models::ClassificationOutcome;

const MSG_NOT_FOUND: &str = "Expense not found";
const MSG_LOAD_FAILED: &str = "Failed to load expense";
const MSG_CATEGORIES_FAILED: &str = "Failed to load categories";
const MSG_NO_CATEGORY: &str = "Could not predict category";
const MSG_AI_ERROR: &str = "AI service error";
const MSG_SAVE_FAILED: &str = "Failed to save category";

/// Categorizes stored expenses and keeps category usage in step
pub struct BatchCategorizer<'a> {
    expenses: &'a dyn ExpenseStore,
    registry: CategoryRegistry<'a>,
    resolver: CategoryResolver,
}

impl<'a> BatchCategorizer<'a> {
    pub fn new(
        expenses: &'a dyn ExpenseStore,
        categories: &'a dyn CategoryStore,
        resolver: CategoryResolver,
    ) -> Self {
        Self {
            expenses,
            registry: CategoryRegistry::new(categories),
            resolver,
        }
    }

    /// Categorize each expense in `ids`, returning one outcome per id in order
    ///
    /// Fails only when `ids` is empty; per-item problems are reported in the
    /// outcomes.
    pub async fn categorize_batch(&self, ids: &[i64]) -> Result<Vec<ClassificationOutcome>> {
        if ids.is_empty() {
            return Err(Error::InvalidRequest(
                "Please provide valid expense IDs".into(),
            ));
        }

        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            outcomes.push(self.categorize_one(id).await);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            total = outcomes.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "Batch categorization complete"
        );

        Ok(outcomes)
    }

    async fn categorize_one(&self, id: i64) -> ClassificationOutcome {
        let expense = match self.expenses.get_expense(id) {
            Ok(Some(expense)) => expense,
            Ok(None) => {
                debug!(id, "Expense not found");
                return ClassificationOutcome::error(id, MSG_NOT_FOUND);
            }
            Err(e) => {
                warn!(id, error = %e, "Failed to load expense");
                return ClassificationOutcome::error(id, MSG_LOAD_FAILED);
            }
        };

        // Re-read per item so categories created earlier in the batch count
        let known = match self.registry.names() {
            Ok(names) => names,
            Err(e) => {
                warn!(id, error = %e, "Failed to load categories");
                return ClassificationOutcome::error(id, MSG_CATEGORIES_FAILED);
            }
        };

        let resolution = match self.resolver.resolve(&expense.description, &known).await {
            Ok(resolution) => resolution,
            Err(Error::NoCategoryAvailable) => {
                warn!(id, "No category available");
                return ClassificationOutcome::error(id, MSG_NO_CATEGORY);
            }
            Err(e) => {
                warn!(id, error = %e, "Category resolution failed");
                return ClassificationOutcome::error(id, MSG_AI_ERROR);
            }
        };

        if let Err(e) = self.expenses.update_expense(
            id,
            &expense.description,
            expense.amount,
            Some(&resolution.category),
            expense.expense_date,
        ) {
            warn!(id, error = %e, "Failed to save category");
            let message = match e {
                Error::NotFound(_) => MSG_NOT_FOUND,
                _ => MSG_SAVE_FAILED,
            };
            return ClassificationOutcome::error(id, message);
        }

        if let Err(e) = self.registry.increment_usage(&resolution.category) {
            warn!(id, error = %e, "Failed to record category usage");
            return ClassificationOutcome::error(id, MSG_SAVE_FAILED);
        }

        debug!(
            id,
            category = %resolution.category,
            source = %resolution.source,
            previous = ?expense.category,
            "Expense categorized"
        );
        ClassificationOutcome::success(id, expense.category.as_deref(), &resolution.category)
    }
}
