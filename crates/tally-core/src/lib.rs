//! Tally Core Library
//!
//! Shared functionality for the Tally expense tracker:
//! - Database access, migrations and default category seeding
//! - Pluggable AI backends (OpenAI chat completions, mock)
//! - Prompt library for customizable AI prompts
//! - Categorization engine (registry, keyword and semantic classifiers,
//!   resolver, batch categorizer)

pub mod ai;
pub mod categorize;
pub mod db;
pub mod error;
pub mod models;
pub mod prompts;

/// Test utilities including a mock chat completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, MockReply, OpenAIBackend};
pub use categorize::{
    BatchCategorizer, CategoryRegistry, CategoryResolver, CategoryStore, Classifier,
    ExpenseStore, KeywordClassifier, Resolution, SemanticClassifier,
};
pub use db::Database;
pub use error::{Error, Result};
pub use models::*;
pub use prompts::{Prompt, PromptId, PromptLibrary};
