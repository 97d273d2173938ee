//! Keyword-table classifier
//!
//! The fallback tier. Needs no network and always gives the same answer for
//! the same input.

use async_trait::async_trait;

use super::Classifier;
use crate::error::Result;
use crate::models::{same_category, CategorySource};

/// Catch-all category preferred when no keyword matches
pub const MISCELLANEOUS: &str = "Miscellaneous";

/// Keyword tables in priority order; the first matching category wins
const KEYWORD_TABLES: &[(&str, &[&str])] = &[
    (
        "food",
        &[
            "grocery",
            "restaurant",
            "meal",
            "lunch",
            "dinner",
            "breakfast",
            "coffee",
            "pizza",
            "burger",
        ],
    ),
    (
        "transportation",
        &[
            "gas", "fuel", "bus", "train", "taxi", "uber", "lyft", "subway", "car", "vehicle",
            "toll", "parking",
        ],
    ),
    (
        "housing",
        &["rent", "mortgage", "apartment", "home", "house", "property"],
    ),
    (
        "utilities",
        &[
            "electric", "water", "gas", "internet", "phone", "bill", "utility",
        ],
    ),
    (
        "entertainment",
        &[
            "movie",
            "game",
            "concert",
            "show",
            "theater",
            "netflix",
            "spotify",
            "subscription",
        ],
    ),
    (
        "healthcare",
        &[
            "doctor", "medical", "health", "medicine", "dental", "pharmacy", "hospital", "clinic",
        ],
    ),
    (
        "shopping",
        &[
            "clothes", "shoes", "clothing", "amazon", "walmart", "target", "buy", "purchase",
        ],
    ),
    (
        "education",
        &[
            "tuition",
            "book",
            "school",
            "college",
            "university",
            "course",
            "class",
        ],
    ),
];

/// Maps descriptions to categories by substring keywords
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Pick a category from `categories` for `description`
    ///
    /// Tables are tried in priority order and only for categories present in
    /// `categories`. Without a keyword match this falls back to
    /// "Miscellaneous" if known, then to the first category. Returns `None`
    /// only for an empty category list. Names come back as spelled in
    /// `categories`.
    pub fn match_keywords(&self, description: &str, categories: &[String]) -> Option<String> {
        let description = description.to_lowercase();

        for (category, keywords) in KEYWORD_TABLES {
            let Some(known) = find_known(categories, category) else {
                continue;
            };
            if keywords.iter().any(|k| description.contains(k)) {
                return Some(known.clone());
            }
        }

        find_known(categories, MISCELLANEOUS)
            .or_else(|| categories.first())
            .cloned()
    }
}

fn find_known<'a>(categories: &'a [String], name: &str) -> Option<&'a String> {
    categories.iter().find(|c| same_category(c, name))
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, description: &str, categories: &[String]) -> Result<Option<String>> {
        Ok(self.match_keywords(description, categories))
    }

    fn source(&self) -> CategorySource {
        CategorySource::Keyword
    }
}
