use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::Identity;
use crate::detection::pipeline::{run_detection, DetectionReport};
use crate::detection::scoring::ScoreMode;
use crate::errors::AppError;
use crate::state::AppState;

/// Documents above this size are rejected upstream of the pipeline.
pub const MAX_TEXT_CHARS: usize = 50_000;

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub score: f64,
    pub result: DetectionReport,
    pub message: String,
}

/// POST /api/v1/detect
///
/// Works for anonymous and authenticated callers alike. For authenticated
/// callers the result is recorded as a side effect; a failed insert is
/// logged and never fails the response.
pub async fn handle_detect(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, AppError> {
    validate_text(&request.text)?;

    let result = run_detection(&request.text, state.scorer.as_ref(), ScoreMode::PreRewrite).await?;

    if let Some(user_id) = identity.user_id() {
        if let Err(e) = state
            .records
            .insert_detection(user_id, &request.text, &result)
            .await
        {
            warn!("Failed to persist detection record for {user_id}: {e}");
        }
    }

    Ok(Json(DetectResponse {
        score: result.overall_score,
        result,
        message: "Detection completed".to_string(),
    }))
}

pub fn validate_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("Text is required".to_string()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::Validation(
            "Text too long (max 50,000 characters)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::detection::scoring::FixedScorer;
    use crate::models::records::{FailingRecordStore, MemoryRecordStore, RecordStore};
    use crate::subscription::entitlement::MemorySubscriptionStore;

    fn state_with(records: Arc<dyn RecordStore>) -> AppState {
        AppState {
            scorer: Arc::new(FixedScorer(75.0)),
            subscriptions: Arc::new(MemorySubscriptionStore::new()),
            records,
        }
    }

    fn request(text: &str) -> Json<DetectRequest> {
        Json(DetectRequest {
            text: text.to_string(),
        })
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(matches!(validate_text(""), Err(AppError::Validation(_))));
        assert!(matches!(validate_text("  \n "), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_oversized_text_rejected() {
        let text = "a".repeat(MAX_TEXT_CHARS + 1);
        assert!(matches!(validate_text(&text), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_boundary_length_accepted() {
        let text = "a".repeat(MAX_TEXT_CHARS);
        assert!(validate_text(&text).is_ok());
    }

    #[tokio::test]
    async fn test_detect_succeeds_when_record_insert_fails() {
        let state = state_with(Arc::new(FailingRecordStore));
        let response = handle_detect(
            State(state),
            Identity::authenticated(Uuid::new_v4()),
            request("Hello world. This is a test!"),
        )
        .await
        .unwrap();

        // persistence is a side channel; the computed result still ships
        assert_eq!(response.0.score, 75.0);
        assert_eq!(response.0.result.sentences.len(), 2);
    }

    #[tokio::test]
    async fn test_detect_persists_for_authenticated_caller() {
        let records = Arc::new(MemoryRecordStore::new());
        let user_id = Uuid::new_v4();
        let state = state_with(records.clone());

        handle_detect(
            State(state),
            Identity::authenticated(user_id),
            request("Hello world. This is a test!"),
        )
        .await
        .unwrap();

        let stored = records.detections.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, user_id);
        assert_eq!(stored[0].score, 75.0);
    }

    #[tokio::test]
    async fn test_detect_anonymous_skips_persistence() {
        let records = Arc::new(MemoryRecordStore::new());
        let state = state_with(records.clone());

        let response = handle_detect(State(state), Identity::anonymous(), request("Hi there."))
            .await
            .unwrap();

        assert_eq!(response.0.score, 75.0);
        assert!(records.detections.lock().unwrap().is_empty());
    }
}
