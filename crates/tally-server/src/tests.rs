//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tally_core::ai::{MockBackend, MockReply};
use tally_core::models::NewExpense;
use tower::ServiceExt;

/// Router without AI and a handle on its database
fn setup_test_app() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    (create_router_with_ai(db.clone(), None, None), db)
}

fn add_expense(db: &Database, description: &str, category: Option<&str>, date: &str) -> i64 {
    db.create_expense(&NewExpense {
        description: description.to_string(),
        amount: 20.0,
        category: category.map(|c| c.to_string()),
        expense_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    })
    .unwrap()
    .id
}

fn frequency(db: &Database, name: &str) -> i64 {
    db.list_categories()
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.frequency)
        .unwrap_or(0)
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let (app, _db) = setup_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_create_expense() {
    let (app, db) = setup_test_app();
    let before = frequency(&db, "Food");

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/expenses",
            json!({
                "description": "Coffee",
                "amount": 4.5,
                "category": "Food",
                "expenseDate": "2024-03-02"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = get_body_json(response).await;
    assert_eq!(json["description"], "Coffee");
    assert_eq!(json["category"], "Food");
    assert_eq!(json["expense_date"], "2024-03-02");
    assert_eq!(frequency(&db, "Food"), before + 1);
}

#[tokio::test]
async fn test_create_expense_missing_fields() {
    let (app, _db) = setup_test_app();

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/expenses",
            json!({ "description": "Coffee" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Description, amount, and date are required");
}

#[tokio::test]
async fn test_create_expense_invalid_json() {
    let (app, _db) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/expenses")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_expenses() {
    let (app, db) = setup_test_app();
    add_expense(&db, "Older", None, "2024-01-05");
    add_expense(&db, "Newer", None, "2024-02-05");

    let response = app.oneshot(get("/api/expenses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let expenses = json.as_array().unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0]["description"], "Newer");
}

#[tokio::test]
async fn test_get_expense_not_found() {
    let (app, _db) = setup_test_app();

    let response = app.oneshot(get("/api/expenses/404")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Expense not found");
}

#[tokio::test]
async fn test_update_expense_partial() {
    let (app, db) = setup_test_app();
    let id = add_expense(&db, "Book", Some("Shopping"), "2024-04-01");
    let education_before = frequency(&db, "Education");

    let response = app
        .oneshot(send_json(
            "PUT",
            &format!("/api/expenses/{}", id),
            json!({ "category": "Education" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["description"], "Book");
    assert_eq!(json["amount"], 20.0);
    assert_eq!(json["category"], "Education");
    assert_eq!(frequency(&db, "Education"), education_before + 1);
}

#[tokio::test]
async fn test_update_same_category_does_not_increment() {
    let (app, db) = setup_test_app();
    let id = add_expense(&db, "Book", Some("Education"), "2024-04-01");
    let before = frequency(&db, "Education");

    let response = app
        .oneshot(send_json(
            "PUT",
            &format!("/api/expenses/{}", id),
            json!({ "category": "education", "amount": 35.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["amount"], 35.0);
    assert_eq!(frequency(&db, "Education"), before);
}

#[tokio::test]
async fn test_update_non_ascii_case_change_does_not_increment() {
    let (app, db) = setup_test_app();
    db.increment_category_usage("Café").unwrap();
    let id = add_expense(&db, "Espresso", Some("Café"), "2024-04-02");
    let before = frequency(&db, "Café");

    let response = app
        .oneshot(send_json(
            "PUT",
            &format!("/api/expenses/{}", id),
            json!({ "category": "CAFÉ" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(frequency(&db, "Café"), before);
    assert_eq!(frequency(&db, "CAFÉ"), 0);
}

#[tokio::test]
async fn test_update_expense_not_found() {
    let (app, _db) = setup_test_app();

    let response = app
        .oneshot(send_json(
            "PUT",
            "/api/expenses/999",
            json!({ "description": "Nothing" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_expense() {
    let (app, db) = setup_test_app();
    let id = add_expense(&db, "Gym", None, "2024-04-01");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/expenses/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expense deleted successfully");
    assert_eq!(json["expense"]["id"], id);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/expenses/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expenses_by_month() {
    let (app, db) = setup_test_app();
    add_expense(&db, "Rent", Some("Housing"), "2024-05-01");
    add_expense(&db, "Lunch", Some("Food"), "2024-05-12");
    add_expense(&db, "Other month", Some("Food"), "2024-06-01");

    let response = app
        .oneshot(get("/api/expenses/month/2024/5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["expenses"].as_array().unwrap().len(), 2);
    assert_eq!(json["summary"].as_array().unwrap().len(), 2);
    assert_eq!(json["totalAmount"], 40.0);
}

#[tokio::test]
async fn test_monthly_summary() {
    let (app, db) = setup_test_app();
    add_expense(&db, "Lunch", Some("Food"), "2024-05-12");
    add_expense(&db, "Dinner", Some("Food"), "2024-05-13");

    let response = app
        .oneshot(get("/api/expenses/summary/2024/5"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["month"], 5);
    assert_eq!(json["year"], 2024);
    assert_eq!(json["totalAmount"], 40.0);
    assert_eq!(json["summary"][0]["category"], "Food");
    assert_eq!(json["summary"][0]["transaction_count"], 2);
}

#[tokio::test]
async fn test_monthly_summary_invalid_month() {
    let (app, _db) = setup_test_app();

    let response = app
        .oneshot(get("/api/expenses/summary/2024/13"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Categorization API Tests ==========

#[tokio::test]
async fn test_categorize_requires_ids() {
    for body in [json!({}), json!({ "expenseIds": [] }), json!({ "expenseIds": "1" })] {
        let (app, _db) = setup_test_app();
        let response = app
            .oneshot(send_json("POST", "/api/expenses/categorize", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert_eq!(json["error"], "Please provide valid expense IDs");
    }
}

#[tokio::test]
async fn test_categorize_keyword_fallback() {
    let (app, db) = setup_test_app();
    let lunch = add_expense(&db, "lunch and gas", None, "2024-05-01");
    let missing = lunch + 50;

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/expenses/categorize",
            json!({ "expenseIds": [missing, lunch] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["id"], missing);
    assert_eq!(results[0]["status"], "error");
    assert_eq!(results[0]["message"], "Expense not found");

    assert_eq!(results[1]["id"], lunch);
    assert_eq!(results[1]["status"], "success");
    assert_eq!(results[1]["previousCategory"], "None");
    assert_eq!(results[1]["newCategory"], "Food");

    let stored = db.get_expense(lunch).unwrap().unwrap();
    assert_eq!(stored.category.as_deref(), Some("Food"));
}

#[tokio::test]
async fn test_categorize_with_ai_backend() {
    let db = Database::in_memory().unwrap();
    let id = add_expense(&db, "Weekend plans", Some("Shopping"), "2024-05-01");
    let ai = AIClient::Mock(MockBackend::with_replies([MockReply::Text(
        "entertainment".into(),
    )]));
    let app = create_router_with_ai(db.clone(), Some(ai), None);

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/expenses/categorize",
            json!({ "expenseIds": [id] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let result = &json["results"][0];
    assert_eq!(result["previousCategory"], "Shopping");
    assert_eq!(result["newCategory"], "Entertainment");
}

// ========== Category API Tests ==========

#[tokio::test]
async fn test_list_categories() {
    let (app, db) = setup_test_app();
    db.increment_category_usage("Utilities").unwrap();

    let response = app.oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json.as_array().unwrap();
    assert_eq!(categories.len(), 8);
    assert_eq!(categories[0]["name"], "Utilities");
    assert_eq!(categories[0]["frequency"], 2);
}

#[tokio::test]
async fn test_list_categories_with_limit() {
    let (app, _db) = setup_test_app();

    let response = app.oneshot(get("/api/categories?limit=3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_categories_negative_limit() {
    let (app, _db) = setup_test_app();

    let response = app
        .oneshot(get("/api/categories?limit=-1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_ai_connection_uses_given_client() {
    check_ai_connection(None).await;
    check_ai_connection(Some(&AIClient::Mock(MockBackend::new()))).await;
    check_ai_connection(Some(&AIClient::Mock(MockBackend::unhealthy()))).await;
}
