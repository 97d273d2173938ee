//! Mock backend for testing
//!
//! Without a script it answers with the first category whose name appears in
//! the description. Tests can script exact replies and failures per call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::parsing::match_category;
use super::AIBackend;

/// One scripted response
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Raw reply text, validated like a real provider reply
    Text(String),
    /// Fail the call with a provider error
    Fail(String),
}

/// Mock AI backend for testing
///
/// Clones share the script and the call counter.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self::default()
    }

    /// Mock that plays back `replies` in order, then reverts to the default behavior
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let mock = Self::new();
        if let Ok(mut script) = mock.script.lock() {
            script.extend(replies);
        }
        mock
    }

    /// Mock whose every call fails
    pub fn failing() -> Self {
        Self::with_replies(
            std::iter::repeat(MockReply::Fail("mock provider failure".into())).take(1024),
        )
    }

    /// Number of categorization calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Result<Option<MockReply>> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| Error::Provider("Mock script lock poisoned".into()))?;
        Ok(script.pop_front())
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn categorize_expense(
        &self,
        description: &str,
        categories: &[String],
    ) -> Result<Option<String>> {
        if categories.is_empty() {
            return Ok(None);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.next_reply()? {
            Some(MockReply::Text(reply)) => Ok(match_category(&reply, categories)),
            Some(MockReply::Fail(message)) => Err(Error::Provider(message)),
            None => {
                let lower = description.to_lowercase();
                Ok(categories
                    .iter()
                    .find(|c| lower.contains(&c.to_lowercase()))
                    .cloned())
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<String> {
        vec!["Food".into(), "Shopping".into()]
    }

    #[tokio::test]
    async fn test_mock_default_matches_name_in_description() {
        let mock = MockBackend::new();
        let result = mock
            .categorize_expense("weekly shopping trip", &categories())
            .await
            .unwrap();
        assert_eq!(result.as_deref(), Some("Shopping"));

        let none = mock
            .categorize_expense("parking meter", &categories())
            .await
            .unwrap();
        assert!(none.is_none());
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_scripted_replies() {
        let mock = MockBackend::with_replies([
            MockReply::Text(" food ".into()),
            MockReply::Text("Groceries".into()),
            MockReply::Fail("timeout".into()),
        ]);

        let first = mock.categorize_expense("x", &categories()).await.unwrap();
        assert_eq!(first.as_deref(), Some("Food"));

        let second = mock.categorize_expense("x", &categories()).await.unwrap();
        assert!(second.is_none());

        let third = mock.categorize_expense("x", &categories()).await;
        assert!(matches!(third, Err(Error::Provider(_))));
    }

    #[tokio::test]
    async fn test_mock_empty_categories_skips_call() {
        let mock = MockBackend::failing();
        let result = mock.categorize_expense("lunch", &[]).await.unwrap();
        assert!(result.is_none());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_mock_clones_share_state() {
        let mock = MockBackend::with_replies([MockReply::Text("Food".into())]);
        let clone = mock.clone();
        clone.categorize_expense("x", &categories()).await.unwrap();
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
