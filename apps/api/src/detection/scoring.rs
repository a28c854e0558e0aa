//! Scoring Policy — pluggable, trait-based scorer that assigns a bounded
//! AI-likelihood score to a text unit.
//!
//! Default: `UniformScorer` (bounded pseudo-random placeholder encoding the
//! product assumption "rewritten text scores lower"). A real classifier
//! replaces it behind the same trait without touching the aggregator,
//! pipeline, or handlers.
//!
//! `AppState` holds an `Arc<dyn ScoringPolicy>`, swapped at startup.

use std::ops::Range;
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::detection::segmenter::TextUnit;
use crate::errors::AppError;

/// Whether the unit being scored is original input or rewriter output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    PreRewrite,
    PostRewrite,
}

/// Score range drawn for original input: [50, 95).
pub const PRE_REWRITE_RANGE: Range<f64> = 50.0..95.0;
/// Score range drawn for rewriter output: [20, 50).
pub const POST_REWRITE_RANGE: Range<f64> = 20.0..50.0;

/// A `TextUnit` with its assigned likelihood score in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredUnit {
    pub text: String,
    pub score: f64,
    pub start: usize,
    pub end: usize,
}

/// The scoring seam. Implement this to swap backends without touching
/// callers. Async because a production classifier is a remote model call.
#[async_trait]
pub trait ScoringPolicy: Send + Sync {
    async fn score(&self, unit: &TextUnit, mode: ScoreMode) -> Result<f64, AppError>;
}

/// Placeholder scorer: uniform draw from the mode's range.
///
/// Seedable so tests get a reproducible score sequence; production uses
/// `from_entropy`.
pub struct UniformScorer {
    rng: Mutex<StdRng>,
}

impl UniformScorer {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl ScoringPolicy for UniformScorer {
    async fn score(&self, _unit: &TextUnit, mode: ScoreMode) -> Result<f64, AppError> {
        let range = match mode {
            ScoreMode::PreRewrite => PRE_REWRITE_RANGE,
            ScoreMode::PostRewrite => POST_REWRITE_RANGE,
        };
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("scorer RNG lock poisoned")))?;
        Ok(rng.gen_range(range))
    }
}

/// Constant scorer for deterministic pipeline tests and fixtures.
#[allow(dead_code)]
pub struct FixedScorer(pub f64);

#[async_trait]
impl ScoringPolicy for FixedScorer {
    async fn score(&self, _unit: &TextUnit, _mode: ScoreMode) -> Result<f64, AppError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(text: &str) -> TextUnit {
        TextUnit {
            text: text.to_string(),
            start: 0,
            end: text.len(),
        }
    }

    #[tokio::test]
    async fn test_pre_rewrite_scores_within_range() {
        let scorer = UniformScorer::seeded(7);
        for _ in 0..200 {
            let score = scorer
                .score(&unit("hello"), ScoreMode::PreRewrite)
                .await
                .unwrap();
            assert!((50.0..95.0).contains(&score), "score was {score}");
        }
    }

    #[tokio::test]
    async fn test_post_rewrite_scores_within_range() {
        let scorer = UniformScorer::seeded(7);
        for _ in 0..200 {
            let score = scorer
                .score(&unit("hello"), ScoreMode::PostRewrite)
                .await
                .unwrap();
            assert!((20.0..50.0).contains(&score), "score was {score}");
        }
    }

    #[tokio::test]
    async fn test_same_seed_reproduces_sequence() {
        let a = UniformScorer::seeded(42);
        let b = UniformScorer::seeded(42);
        for _ in 0..10 {
            let sa = a.score(&unit("x"), ScoreMode::PreRewrite).await.unwrap();
            let sb = b.score(&unit("x"), ScoreMode::PreRewrite).await.unwrap();
            assert_eq!(sa, sb);
        }
    }

    #[tokio::test]
    async fn test_fixed_scorer_ignores_mode() {
        let scorer = FixedScorer(63.5);
        let pre = scorer.score(&unit("x"), ScoreMode::PreRewrite).await.unwrap();
        let post = scorer
            .score(&unit("x"), ScoreMode::PostRewrite)
            .await
            .unwrap();
        assert_eq!(pre, 63.5);
        assert_eq!(post, 63.5);
    }
}
