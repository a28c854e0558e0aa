use axum::{extract::State, Json};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::auth::Identity;
use crate::detection::handlers::validate_text;
use crate::detection::pipeline::run_detection;
use crate::detection::scoring::ScoreMode;
use crate::errors::AppError;
use crate::rewrite::pipeline::{run_rewrite, RewriteStrategy};
use crate::state::AppState;
use crate::subscription::entitlement::require_active;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub text: String,
    #[serde(default)]
    pub strategy: RewriteStrategy,
    #[serde(default)]
    pub detection_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    pub original_text: String,
    pub rewritten_text: String,
    pub original_score: f64,
    pub new_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    pub message: String,
}

/// POST /api/v1/rewrite
///
/// Requires an authenticated identity (401) and an active subscription
/// (403) for either strategy. The rewrite record insert is best-effort:
/// failure is logged and `recordId` omitted, never a failed response.
pub async fn handle_rewrite(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, AppError> {
    validate_text(&request.text)?;
    let user_id = identity.require()?;
    require_active(state.subscriptions.as_ref(), user_id).await?;

    let original_score =
        resolve_original_score(&state, user_id, request.detection_id, &request.text).await?;

    let mut rng = StdRng::from_entropy();
    let outcome = run_rewrite(
        &request.text,
        request.strategy,
        state.scorer.as_ref(),
        &mut rng,
        original_score,
    )
    .await?;

    let record_id = match state
        .records
        .insert_rewrite(
            user_id,
            &outcome.original_text,
            &outcome.rewritten_text,
            request.detection_id,
        )
        .await
    {
        Ok(record) => Some(record.id),
        Err(e) => {
            warn!("Failed to persist rewrite record for {user_id}: {e}");
            None
        }
    };

    Ok(Json(RewriteResponse {
        original_text: outcome.original_text,
        rewritten_text: outcome.rewritten_text,
        original_score: outcome.original_score,
        new_score: outcome.new_score,
        record_id,
        message: "Rewrite completed".to_string(),
    }))
}

/// The response's original score comes from the prior detection named by
/// `detectionId` when present and owned by the caller; otherwise from a
/// fresh pre-rewrite detection of the input text.
async fn resolve_original_score(
    state: &AppState,
    user_id: Uuid,
    detection_id: Option<Uuid>,
    text: &str,
) -> Result<f64, AppError> {
    if let Some(id) = detection_id {
        match state.records.detection_score(id, user_id).await {
            Ok(Some(score)) => return Ok(score),
            Ok(None) => {}
            Err(e) => return Err(AppError::Internal(e)),
        }
    }
    let report = run_detection(text, state.scorer.as_ref(), ScoreMode::PreRewrite).await?;
    Ok(report.overall_score)
}
