//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use tally_core::categorize::CategoryRegistry;
use tally_core::models::Category;

#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    pub limit: Option<i64>,
}

/// GET /api/categories - Categories ranked by usage, optionally only the top `limit`
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<Vec<Category>>, AppError> {
    let registry = CategoryRegistry::new(&state.db);

    let categories = match query.limit {
        Some(limit) if limit < 0 => return Err(AppError::bad_request("limit must not be negative")),
        Some(limit) => registry.get_most_frequent(limit)?,
        None => registry.get_all()?,
    };

    Ok(Json(categories))
}
