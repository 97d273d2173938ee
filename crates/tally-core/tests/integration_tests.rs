//! Integration tests for tally-core
//!
//! These tests exercise the full add → categorize → summarize workflow.

use axum::{routing::post, Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use tally_core::{
    AIClient, BatchCategorizer, CategoryRegistry, CategoryResolver, ClassificationOutcome,
    Database, MockBackend, MockReply, NewExpense, OpenAIBackend, PromptLibrary,
};

fn add(db: &Database, description: &str, amount: f64, day: u32) -> i64 {
    db.create_expense(&NewExpense {
        description: description.to_string(),
        amount,
        category: None,
        expense_date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
    })
    .expect("Failed to create expense")
    .id
}

/// Chat completions stub that always answers `reply`
async fn start_stub(reply: &'static str) -> String {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |Json(_body): Json<Value>| async move {
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": reply } }]
            }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// =============================================================================
// Keyword-only workflow
// =============================================================================

#[tokio::test]
async fn test_keyword_workflow_updates_expenses_and_usage() {
    let db = Database::in_memory().expect("Failed to create database");

    let lunch = add(&db, "Team lunch", 42.0, 3);
    let rent = add(&db, "July rent", 1500.0, 1);
    let train = add(&db, "Train to Boston", 60.0, 10);

    let batch = BatchCategorizer::new(&db, &db, CategoryResolver::keyword_only());
    let outcomes = batch
        .categorize_batch(&[lunch, rent, train])
        .await
        .expect("Batch failed");

    assert_eq!(
        outcomes,
        vec![
            ClassificationOutcome::success(lunch, None, "Food"),
            ClassificationOutcome::success(rent, None, "Housing"),
            ClassificationOutcome::success(train, None, "Transportation"),
        ]
    );

    // Each seeded category gained one use
    let registry = CategoryRegistry::new(&db);
    let ranked = registry.get_most_frequent(3).unwrap();
    let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Food", "Housing", "Transportation"]);
    assert!(ranked.iter().all(|c| c.frequency == 2));

    // Summary sees the new categories
    let summary = db.monthly_summary(2024, 7).unwrap();
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].category.as_deref(), Some("Housing"));
    assert!(db.list_uncategorized_expenses().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_created_mid_batch_is_visible_to_later_items() {
    let db = Database::in_memory().unwrap();
    let first = add(&db, "Dog food", 30.0, 5);
    let second = add(&db, "Vet visit", 80.0, 6);

    // Registered between runs, as a user-created category would be
    db.increment_category_usage("Pets").unwrap();

    let mock = MockBackend::with_replies([
        MockReply::Text("pets".into()),
        MockReply::Text("Pets".into()),
    ]);
    let resolver = CategoryResolver::new(Some(AIClient::Mock(mock)));
    let batch = BatchCategorizer::new(&db, &db, resolver);

    let outcomes = batch.categorize_batch(&[first, second]).await.unwrap();
    assert_eq!(outcomes[0].new_category(), Some("Pets"));
    assert_eq!(outcomes[1].new_category(), Some("Pets"));

    let pets = CategoryRegistry::new(&db)
        .get_all()
        .unwrap()
        .into_iter()
        .find(|c| c.name == "Pets")
        .unwrap();
    assert_eq!(pets.frequency, 3);
}

// =============================================================================
// OpenAI-compatible provider workflow
// =============================================================================

#[tokio::test]
async fn test_openai_backend_end_to_end() {
    let url = start_stub("Entertainment").await;
    let db = Database::in_memory().unwrap();
    let id = add(&db, "Saturday plans", 25.0, 13);

    let backend = OpenAIBackend::new(&url, "gpt-3.5-turbo", "sk-test")
        .with_prompts(PromptLibrary::embedded_only());
    let resolver = CategoryResolver::new(Some(AIClient::OpenAI(backend)));
    let batch = BatchCategorizer::new(&db, &db, resolver);

    let outcomes = batch.categorize_batch(&[id]).await.unwrap();
    assert_eq!(
        outcomes,
        vec![ClassificationOutcome::success(id, None, "Entertainment")]
    );
}

#[tokio::test]
async fn test_unreachable_provider_falls_back_to_keywords() {
    let db = Database::in_memory().unwrap();
    let id = add(&db, "Pharmacy pickup", 12.0, 20);

    let backend = OpenAIBackend::new("http://127.0.0.1:1", "gpt-3.5-turbo", "sk-test")
        .with_prompts(PromptLibrary::embedded_only());
    let resolver = CategoryResolver::new(Some(AIClient::OpenAI(backend)));
    let batch = BatchCategorizer::new(&db, &db, resolver);

    let outcomes = batch.categorize_batch(&[id]).await.unwrap();
    assert_eq!(outcomes[0].new_category(), Some("Healthcare"));
}
