//! Category resolution: semantic classifier first, keyword tables as fallback

use tracing::{debug, warn};

use super::{Classifier, KeywordClassifier, SemanticClassifier};
use crate::ai::AIClient;
use crate::error::{Error, Result};
use crate::models::{same_category, CategorySource};

/// A resolved category and the tier that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Spelled as in the known set
    pub category: String,
    pub source: CategorySource,
}

/// Picks a category from the known set for a description
///
/// Provider failures never escape `resolve`; they trigger the keyword
/// fallback instead.
pub struct CategoryResolver {
    primary: Option<Box<dyn Classifier>>,
    fallback: KeywordClassifier,
}

impl CategoryResolver {
    /// Resolver with a semantic tier when an AI client is configured
    pub fn new(ai: Option<AIClient>) -> Self {
        match ai {
            Some(ai) => Self::with_primary(Box::new(SemanticClassifier::new(ai))),
            None => Self::keyword_only(),
        }
    }

    pub fn keyword_only() -> Self {
        Self {
            primary: None,
            fallback: KeywordClassifier::new(),
        }
    }

    /// Resolver with any primary classifier ahead of the keyword tables
    pub fn with_primary(primary: Box<dyn Classifier>) -> Self {
        Self {
            primary: Some(primary),
            fallback: KeywordClassifier::new(),
        }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Resolve a category for `description` from `known`
    ///
    /// Fails with `NoCategoryAvailable` only when `known` is empty.
    pub async fn resolve(&self, description: &str, known: &[String]) -> Result<Resolution> {
        if let Some(primary) = &self.primary {
            match primary.classify(description, known).await {
                Ok(Some(candidate)) => match canonical(&candidate, known) {
                    Some(category) => {
                        debug!(category = %category, source = %primary.source(), "Category resolved");
                        return Ok(Resolution {
                            category,
                            source: primary.source(),
                        });
                    }
                    None => {
                        warn!(
                            candidate = %candidate,
                            "Classifier returned an unknown category, falling back to keywords"
                        );
                    }
                },
                Ok(None) => {
                    debug!("Classifier declined, falling back to keywords");
                }
                Err(e) => {
                    warn!(error = %e, "Classifier failed, falling back to keywords");
                }
            }
        }

        let category = self
            .fallback
            .match_keywords(description, known)
            .ok_or(Error::NoCategoryAvailable)?;
        debug!(category = %category, source = %self.fallback.source(), "Category resolved");

        Ok(Resolution {
            category,
            source: self.fallback.source(),
        })
    }
}

/// The known spelling of `candidate`, if it is in the known set
fn canonical(candidate: &str, known: &[String]) -> Option<String> {
    known.iter().find(|k| same_category(k, candidate)).cloned()
}
