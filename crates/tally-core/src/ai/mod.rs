//! Pluggable AI backend abstraction
//!
//! # Architecture
//!
//! - `AIBackend` trait: the interface every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAIBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//!
//! if let Some(ref client) = ai {
//!     let categories = vec!["Food".to_string(), "Housing".to_string()];
//!     let category = client.categorize_expense("Lunch with team", &categories).await?;
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, mock). Default: openai
//! - `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`, `OPENAI_TIMEOUT_SECS`:
//!   see [`OpenAIBackend`]

mod mock;
mod openai;
pub mod parsing;

pub use mock::{MockBackend, MockReply};
pub use openai::OpenAIBackend;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all AI backends
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Pick one of `categories` for an expense description
    ///
    /// Returns `Ok(None)` when the backend declines or answers with a name
    /// outside `categories`. The returned name is spelled as in `categories`.
    async fn categorize_expense(
        &self,
        description: &str,
        categories: &[String],
    ) -> Result<Option<String>>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI chat completions (or a compatible server)
    OpenAI(OpenAIBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Returns None when the selected backend is not configured.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create an AI client from any key/value source shaped like the environment
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let backend = get("AI_BACKEND").unwrap_or_else(|| "openai".to_string());

        match backend.trim().to_lowercase().as_str() {
            "openai" | "" => OpenAIBackend::from_lookup(get).map(AIClient::OpenAI),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                OpenAIBackend::from_lookup(get).map(AIClient::OpenAI)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AIBackend for AIClient {
    async fn categorize_expense(
        &self,
        description: &str,
        categories: &[String],
    ) -> Result<Option<String>> {
        match self {
            AIClient::OpenAI(b) => b.categorize_expense(description, categories).await,
            AIClient::Mock(b) => b.categorize_expense(description, categories).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAI(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAI(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAI(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[test]
    fn test_from_lookup_without_key_is_none() {
        assert!(AIClient::from_lookup(lookup(&[])).is_none());
    }

    #[test]
    fn test_from_lookup_selects_backend() {
        let openai = AIClient::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-1")])).unwrap();
        assert!(matches!(openai, AIClient::OpenAI(_)));

        let mock = AIClient::from_lookup(lookup(&[("AI_BACKEND", "Mock")])).unwrap();
        assert!(matches!(mock, AIClient::Mock(_)));

        let unknown = AIClient::from_lookup(lookup(&[
            ("AI_BACKEND", "carrier-pigeon"),
            ("OPENAI_API_KEY", "sk-1"),
        ]))
        .unwrap();
        assert!(matches!(unknown, AIClient::OpenAI(_)));
    }

    #[tokio::test]
    async fn test_client_dispatches_to_mock() {
        let client = AIClient::Mock(MockBackend::with_replies([MockReply::Text(
            "Housing".into(),
        )]));
        let categories = vec!["Food".to_string(), "Housing".to_string()];
        let result = client
            .categorize_expense("monthly rent", &categories)
            .await
            .unwrap();
        assert_eq!(result.as_deref(), Some("Housing"));
        assert!(client.health_check().await);
    }
}
