//! Detection pipeline — segment → score → aggregate.
//!
//! Identity-agnostic: persistence of detection records is a handler-side
//! side effect, so this stays testable without a database.

use serde::{Deserialize, Serialize};

use crate::detection::aggregate::aggregate;
use crate::detection::scoring::{ScoreMode, ScoredUnit, ScoringPolicy};
use crate::detection::segmenter::segment_sentences;
use crate::errors::AppError;

/// Per-document detection result: the 2-decimal rounded mean of all
/// sentence scores plus the scored sentences in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub overall_score: f64,
    pub sentences: Vec<ScoredUnit>,
}

/// Runs the full detect pipeline over `text`.
///
/// `mode` selects the scorer's range: `PreRewrite` for caller input,
/// `PostRewrite` when re-scoring rewriter output.
pub async fn run_detection(
    text: &str,
    scorer: &dyn ScoringPolicy,
    mode: ScoreMode,
) -> Result<DetectionReport, AppError> {
    let units = segment_sentences(text);
    if units.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let mut sentences = Vec::with_capacity(units.len());
    for unit in units {
        let score = scorer.score(&unit, mode).await?;
        sentences.push(ScoredUnit {
            text: unit.text,
            score,
            start: unit.start,
            end: unit.end,
        });
    }

    let overall_score = aggregate(&sentences)?;
    Ok(DetectionReport {
        overall_score,
        sentences,
    })
}
