//! Tally Web Server
//!
//! Axum-based REST API for the Tally expense tracker.
//!
//! - Expense CRUD, monthly views and summaries
//! - Batch categorization through the categorization engine
//! - Category listing ranked by usage
//! - Sanitized error responses and basic security headers

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use tally_core::ai::{AIBackend, AIClient};
use tally_core::db::Database;

mod handlers;

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Semantic classifier backend; `None` means keyword-only categorization
    pub ai: Option<AIClient>,
}

/// Create the application router with an explicit AI client
pub fn create_router_with_ai(db: Database, ai: Option<AIClient>, static_dir: Option<&str>) -> Router {
    let state = Arc::new(AppState { db, ai });

    let api_routes = Router::new()
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/expenses/categorize", post(handlers::categorize_expenses))
        .route(
            "/expenses/month/:year/:month",
            get(handlers::expenses_by_month),
        )
        .route(
            "/expenses/summary/:year/:month",
            get(handlers::monthly_summary),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        .route("/categories", get(handlers::list_categories));

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    let ai = AIClient::from_env();
    check_ai_connection(ai.as_ref()).await;

    let app = create_router_with_ai(db, ai, static_dir);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    let Some(client) = ai else {
        info!("AI backend not configured (set OPENAI_API_KEY to enable semantic categorization)");
        return;
    };

    if client.health_check().await {
        info!(
            "AI backend connected: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        warn!(
            "AI backend configured but not responding: {} (keyword fallback stays available)",
            client.host()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Generic message to the client, full error in the log
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}

/// Map core errors that carry a client-facing meaning to 4xx responses
pub(crate) fn core_error(err: tally_core::Error) -> AppError {
    match err {
        tally_core::Error::InvalidRequest(msg) => AppError::bad_request(&msg),
        tally_core::Error::NotFound(_) => AppError::not_found("Expense not found"),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests;
