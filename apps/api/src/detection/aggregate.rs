//! Aggregation — reduces per-unit scores to one overall score.

use crate::detection::scoring::ScoredUnit;
use crate::errors::AppError;

/// Arithmetic mean of all unit scores, rounded to 2 decimal places.
/// Zero units is an `EmptyInput` error, never NaN.
pub fn aggregate(units: &[ScoredUnit]) -> Result<f64, AppError> {
    if units.is_empty() {
        return Err(AppError::EmptyInput);
    }
    let mean = units.iter().map(|u| u.score).sum::<f64>() / units.len() as f64;
    Ok(round2(mean))
}

/// Rounds half-up (away from zero) to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
