//! Batch categorization command

use anyhow::Result;
use tally_core::ai::{AIBackend, AIClient};
use tally_core::categorize::{BatchCategorizer, CategoryResolver};
use tally_core::db::Database;
use tally_core::models::{ClassificationOutcome, OutcomeResult};

pub async fn cmd_categorize(
    db: &Database,
    ids: &[i64],
    uncategorized: bool,
) -> Result<Vec<ClassificationOutcome>> {
    let ai = AIClient::from_env();
    match &ai {
        Some(client) => println!(
            "🤖 Using AI backend {} (model: {})",
            client.host(),
            client.model()
        ),
        None => println!("   💡 Tip: Set OPENAI_API_KEY for AI categorization (using keywords)"),
    }

    run_categorize(db, ids, uncategorized, ai).await
}

/// Categorize `ids` (plus every uncategorized expense when asked) and print outcomes
pub async fn run_categorize(
    db: &Database,
    ids: &[i64],
    uncategorized: bool,
    ai: Option<AIClient>,
) -> Result<Vec<ClassificationOutcome>> {
    let mut targets = ids.to_vec();
    if uncategorized {
        for expense in db.list_uncategorized_expenses()? {
            if !targets.contains(&expense.id) {
                targets.push(expense.id);
            }
        }
    }

    if targets.is_empty() && uncategorized {
        println!("Nothing to categorize.");
        return Ok(Vec::new());
    }

    let batch = BatchCategorizer::new(db, db, CategoryResolver::new(ai));
    let outcomes = batch.categorize_batch(&targets).await?;

    for outcome in &outcomes {
        match &outcome.result {
            OutcomeResult::Success {
                previous_category,
                new_category,
            } => println!(
                "  ✓ #{}: {} → {}",
                outcome.id, previous_category, new_category
            ),
            OutcomeResult::Error { message } => println!("  ✗ #{}: {}", outcome.id, message),
        }
    }

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    println!(
        "✅ Categorized {} of {} expense(s)",
        succeeded,
        outcomes.len()
    );

    Ok(outcomes)
}
