//! Language-model classifier

use async_trait::async_trait;

use super::Classifier;
use crate::ai::{AIBackend, AIClient};
use crate::error::Result;
use crate::models::CategorySource;

/// Asks an AI backend to pick a category
#[derive(Clone)]
pub struct SemanticClassifier {
    ai: AIClient,
}

impl SemanticClassifier {
    pub fn new(ai: AIClient) -> Self {
        Self { ai }
    }
}

#[async_trait]
impl Classifier for SemanticClassifier {
    async fn classify(&self, description: &str, categories: &[String]) -> Result<Option<String>> {
        self.ai.categorize_expense(description, categories).await
    }

    fn source(&self) -> CategorySource {
        CategorySource::Semantic
    }
}
