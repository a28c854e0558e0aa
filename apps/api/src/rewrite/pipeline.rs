//! Rewrite pipeline — strategy application plus verification.
//!
//! The orchestrator never trusts a strategy's self-reported improvement:
//! the rewritten text is fed back through the full detection pipeline in
//! post-rewrite mode to produce `new_score`.

use rand::Rng;
use serde::Deserialize;

use crate::detection::pipeline::run_detection;
use crate::detection::scoring::{ScoreMode, ScoringPolicy};
use crate::errors::AppError;
use crate::rewrite::line_sub::rewrite_lines;
use crate::rewrite::word_sub::rewrite_words;

/// The two named rewrite strategies. Both require an active entitlement;
/// the gate itself lives in the handler, next to the identity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RewriteStrategy {
    #[default]
    WordSubstitution,
    LineSubstitution,
}

#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub original_text: String,
    pub rewritten_text: String,
    pub original_score: f64,
    pub new_score: f64,
}

pub fn apply_strategy(text: &str, strategy: RewriteStrategy, rng: &mut impl Rng) -> String {
    match strategy {
        RewriteStrategy::WordSubstitution => rewrite_words(text, rng),
        RewriteStrategy::LineSubstitution => rewrite_lines(text, rng),
    }
}

/// Applies `strategy` and re-detects the output. `original_score` is
/// resolved by the caller (prior detection record or a fresh detection).
pub async fn run_rewrite(
    text: &str,
    strategy: RewriteStrategy,
    scorer: &dyn ScoringPolicy,
    rng: &mut impl Rng,
    original_score: f64,
) -> Result<RewriteOutcome, AppError> {
    let rewritten_text = apply_strategy(text, strategy, rng);
    let report = run_detection(&rewritten_text, scorer, ScoreMode::PostRewrite).await?;

    Ok(RewriteOutcome {
        original_text: text.to_string(),
        rewritten_text,
        original_score,
        new_score: report.overall_score,
    })
}
