//! Test utilities for tally-core
//!
//! A mock OpenAI-compatible chat completions server for adapter and
//! integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// What the mock server answers to every chat completion
#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Status(StatusCode),
}

/// A request the mock server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Value of the `Authorization` header, if sent
    pub authorization: Option<String>,
    /// Parsed JSON body
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    behavior: Behavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock chat completions server for testing
pub struct MockChatServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start a server whose completions always contain `reply`
    pub async fn start(reply: &str) -> Self {
        Self::start_with(Behavior::Reply(reply.to_string())).await
    }

    /// Start a server that fails every completion with `status`
    pub async fn start_with_status(status: StatusCode) -> Self {
        Self::start_with(Behavior::Status(status)).await
    }

    async fn start_with(behavior: Behavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            behavior,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completion))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Chat completion requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{ "id": "gpt-3.5-turbo", "object": "model" }]
    }))
}

async fn handle_chat_completion(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let model = body["model"].as_str().unwrap_or("unknown").to_string();

    state.requests.lock().unwrap().push(RecordedRequest {
        authorization,
        body,
    });

    match &state.behavior {
        Behavior::Reply(reply) => (
            StatusCode::OK,
            Json(json!({
                "id": "chatcmpl-mock",
                "object": "chat.completion",
                "model": model,
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": reply },
                    "finish_reason": "stop"
                }]
            })),
        ),
        Behavior::Status(status) => (
            *status,
            Json(json!({ "error": { "message": "mock failure" } })),
        ),
    }
}
