//! Expense operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{CategorySummary, Expense, NewExpense};

const EXPENSE_COLUMNS: &str = "id, description, amount, category, expense_date, created_at";

/// First day of the month and first day of the following month
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidRequest(format!("Invalid month: {}-{}", year, month)))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| Error::InvalidRequest(format!("Invalid month: {}-{}", year, month)))?;
    Ok((start, end))
}

impl Database {
    /// Insert an expense and return the stored row
    pub fn create_expense(&self, expense: &NewExpense) -> Result<Expense> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            INSERT INTO expenses (description, amount, category, expense_date)
            VALUES (?, ?, ?, ?)
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        );
        let created = conn.query_row(
            &sql,
            params![
                expense.description,
                expense.amount,
                expense.category,
                expense.expense_date.to_string(),
            ],
            Self::row_to_expense,
        )?;

        Ok(created)
    }

    /// List all expenses, newest first
    pub fn list_expenses(&self) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM expenses ORDER BY expense_date DESC, id DESC",
            EXPENSE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let expenses = stmt
            .query_map([], Self::row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// List expenses dated within one calendar month, newest first
    pub fn list_expenses_by_month(&self, year: i32, month: u32) -> Result<Vec<Expense>> {
        let (from, to) = month_range(year, month)?;
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM expenses
            WHERE expense_date >= ? AND expense_date < ?
            ORDER BY expense_date DESC, id DESC
            "#,
            EXPENSE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let expenses = stmt
            .query_map(
                params![from.to_string(), to.to_string()],
                Self::row_to_expense,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// List expenses that have no category yet, oldest first
    pub fn list_uncategorized_expenses(&self) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM expenses
            WHERE category IS NULL OR TRIM(category) = ''
            ORDER BY expense_date ASC, id ASC
            "#,
            EXPENSE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let expenses = stmt
            .query_map([], Self::row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Get a single expense by ID
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS);

        let expense = conn
            .query_row(&sql, params![id], Self::row_to_expense)
            .optional()?;

        Ok(expense)
    }

    /// Overwrite every editable field of an expense
    pub fn update_expense(
        &self,
        id: i64,
        description: &str,
        amount: f64,
        category: Option<&str>,
        expense_date: NaiveDate,
    ) -> Result<Expense> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            UPDATE expenses
            SET description = ?, amount = ?, category = ?, expense_date = ?
            WHERE id = ?
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        );

        conn.query_row(
            &sql,
            params![description, amount, category, expense_date.to_string(), id],
            Self::row_to_expense,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    /// Delete an expense, returning the removed row
    pub fn delete_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let sql = format!("DELETE FROM expenses WHERE id = ? RETURNING {}", EXPENSE_COLUMNS);

        let deleted = conn
            .query_row(&sql, params![id], Self::row_to_expense)
            .optional()?;

        Ok(deleted)
    }

    /// Totals per category for one month, largest first
    pub fn monthly_summary(&self, year: i32, month: u32) -> Result<Vec<CategorySummary>> {
        let (from, to) = month_range(year, month)?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category, SUM(amount) AS total_amount, COUNT(*) AS transaction_count
            FROM expenses
            WHERE expense_date >= ? AND expense_date < ?
            GROUP BY category
            ORDER BY total_amount DESC
            "#,
        )?;

        let summary = stmt
            .query_map(params![from.to_string(), to.to_string()], |row| {
                Ok(CategorySummary {
                    category: row.get(0)?,
                    total_amount: row.get(1)?,
                    transaction_count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summary)
    }

    pub(crate) fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
        let date_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        Ok(Expense {
            id: row.get(0)?,
            description: row.get(1)?,
            amount: row.get(2)?,
            category: row.get(3)?,
            expense_date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            created_at: parse_datetime(&created_at_str),
        })
    }
}

/// Sum of all category totals in a monthly summary
pub fn summary_total(summary: &[CategorySummary]) -> f64 {
    summary.iter().map(|s| s.total_amount).sum()
}

