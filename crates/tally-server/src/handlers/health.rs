//! Liveness check

use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET /health - Server is up
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
