//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{core_error, AppError, AppState};
use tally_core::categorize::{BatchCategorizer, CategoryRegistry, CategoryResolver};
use tally_core::db::summary_total;
use tally_core::models::{same_category, Expense, ExpenseUpdate, NewExpense};

/// Expense bodies are small; anything larger is rejected
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Read and parse a JSON request body
async fn read_json<T: serde::de::DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))
}

/// GET /api/expenses - All expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let expenses = state.db.list_expenses()?;
    Ok(Json(expenses))
}

/// GET /api/expenses/month/:year/:month - Expenses and per-category totals for a month
pub async fn expenses_by_month(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Value>, AppError> {
    let expenses = state.db.list_expenses_by_month(year, month).map_err(core_error)?;
    let summary = state.db.monthly_summary(year, month).map_err(core_error)?;
    let total_amount = summary_total(&summary);

    Ok(Json(json!({
        "expenses": expenses,
        "summary": summary,
        "totalAmount": total_amount,
    })))
}

/// GET /api/expenses/summary/:year/:month - Per-category totals for a month
pub async fn monthly_summary(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Value>, AppError> {
    let summary = state.db.monthly_summary(year, month).map_err(core_error)?;
    let total_amount = summary_total(&summary);

    Ok(Json(json!({
        "summary": summary,
        "totalAmount": total_amount,
        "month": month,
        "year": year,
    })))
}

/// GET /api/expenses/:id - A single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, AppError> {
    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    Ok(Json(expense))
}

/// Request body for creating an expense; fields are checked by hand for a clear 400
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub expense_date: Option<NaiveDate>,
}

/// POST /api/expenses - Create an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let req: CreateExpenseRequest = read_json(request).await?;

    let (Some(description), Some(amount), Some(expense_date)) =
        (req.description, req.amount, req.expense_date)
    else {
        return Err(AppError::bad_request(
            "Description, amount, and date are required",
        ));
    };
    let description = description.trim().to_string();
    if description.is_empty() || !amount.is_finite() {
        return Err(AppError::bad_request(
            "Description, amount, and date are required",
        ));
    }

    let category = req
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let expense = state.db.create_expense(&NewExpense {
        description,
        amount,
        category,
        expense_date,
    })?;

    if let Some(category) = &expense.category {
        CategoryRegistry::new(&state.db).increment_usage(category)?;
    }

    info!(id = expense.id, "Expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /api/expenses/:id - Update an expense; omitted fields keep their values
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let update: ExpenseUpdate = read_json(request).await?;

    let existing = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    let description = update
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| existing.description.clone());
    let amount = match update.amount {
        Some(a) if !a.is_finite() => return Err(AppError::bad_request("Invalid amount")),
        Some(a) => a,
        None => existing.amount,
    };
    let new_category = update
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let category = new_category.clone().or_else(|| existing.category.clone());
    let expense_date = update.expense_date.unwrap_or(existing.expense_date);

    let updated = state
        .db
        .update_expense(id, &description, amount, category.as_deref(), expense_date)
        .map_err(core_error)?;

    if let Some(new_category) = new_category {
        let changed = existing
            .category
            .as_deref()
            .map_or(true, |old| !same_category(old, &new_category));
        if changed {
            CategoryRegistry::new(&state.db).increment_usage(&new_category)?;
        }
    }

    Ok(Json(updated))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let expense = state
        .db
        .delete_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    info!(id, "Expense deleted");
    Ok(Json(json!({
        "message": "Expense deleted successfully",
        "expense": expense,
    })))
}

/// Request body for batch categorization
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeRequest {
    #[serde(default)]
    pub expense_ids: Option<Vec<i64>>,
}

/// POST /api/expenses/categorize - Assign categories to a batch of expenses
pub async fn categorize_expenses(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Value>, AppError> {
    const INVALID_IDS: &str = "Please provide valid expense IDs";

    let req: CategorizeRequest = read_json(request)
        .await
        .map_err(|_| AppError::bad_request(INVALID_IDS))?;
    let ids = req.expense_ids.unwrap_or_default();
    if ids.is_empty() {
        return Err(AppError::bad_request(INVALID_IDS));
    }

    let resolver = CategoryResolver::new(state.ai.clone());
    let batch = BatchCategorizer::new(&state.db, &state.db, resolver);
    let results = batch.categorize_batch(&ids).await.map_err(core_error)?;

    Ok(Json(json!({ "results": results })))
}
