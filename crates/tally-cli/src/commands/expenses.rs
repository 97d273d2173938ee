//! Expense commands (add, list)

use anyhow::{bail, Result};
use chrono::Local;
use tally_core::categorize::CategoryRegistry;
use tally_core::db::{summary_total, Database};
use tally_core::models::{Expense, NewExpense};

use super::{parse_date, parse_month, truncate};

pub fn cmd_add(
    db: &Database,
    description: &str,
    amount: f64,
    category: Option<&str>,
    date: Option<&str>,
) -> Result<Expense> {
    let description = description.trim();
    if description.is_empty() {
        bail!("Description must not be empty");
    }
    if !amount.is_finite() {
        bail!("Amount must be a number");
    }

    let expense_date = match date {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let category = category.map(str::trim).filter(|c| !c.is_empty());

    let expense = db.create_expense(&NewExpense {
        description: description.to_string(),
        amount,
        category: category.map(str::to_string),
        expense_date,
    })?;

    if let Some(category) = &expense.category {
        CategoryRegistry::new(db).increment_usage(category)?;
    }

    println!(
        "✅ Added expense #{}: {} ${:.2} on {}{}",
        expense.id,
        expense.description,
        expense.amount,
        expense.expense_date,
        expense
            .category
            .as_deref()
            .map(|c| format!(" [{}]", c))
            .unwrap_or_default()
    );

    Ok(expense)
}

pub fn cmd_list(db: &Database, month: Option<&str>) -> Result<()> {
    let (expenses, period) = match month {
        Some(m) => {
            let (year, month) = parse_month(m)?;
            (
                db.list_expenses_by_month(year, month)?,
                Some((year, month)),
            )
        }
        None => (db.list_expenses()?, None),
    };

    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!(
        "{:>5}  {:10}  {:30}  {:>10}  {}",
        "ID", "Date", "Description", "Amount", "Category"
    );
    println!("{}", "-".repeat(76));
    for e in &expenses {
        println!(
            "{:>5}  {:10}  {:30}  {:>10.2}  {}",
            e.id,
            e.expense_date,
            truncate(&e.description, 30),
            e.amount,
            e.category.as_deref().unwrap_or("-")
        );
    }

    if let Some((year, month)) = period {
        let summary = db.monthly_summary(year, month)?;
        println!();
        println!("Summary for {}-{:02}:", year, month);
        for s in &summary {
            println!(
                "  {:20} {:>10.2}  ({} expenses)",
                s.category.as_deref().unwrap_or("Uncategorized"),
                s.total_amount,
                s.transaction_count
            );
        }
        println!("  {:20} {:>10.2}", "Total", summary_total(&summary));
    }

    Ok(())
}
