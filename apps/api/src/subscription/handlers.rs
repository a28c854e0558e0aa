use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::subscription::SubscriptionRow;
use crate::state::AppState;
use crate::subscription::entitlement::{create_trial, find_active};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSubscriptionResponse {
    pub has_subscription: bool,
    pub subscription: Option<SubscriptionRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    pub success: bool,
    pub subscription: SubscriptionRow,
    pub message: String,
}

/// GET /api/v1/subscription/check
///
/// Reports whether the caller currently holds an active, unexpired
/// subscription. Expiry is derived here at read time; nothing is written.
pub async fn handle_check_subscription(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<CheckSubscriptionResponse>, AppError> {
    let user_id = identity.require()?;
    let subscription = find_active(state.subscriptions.as_ref(), user_id).await?;
    Ok(Json(CheckSubscriptionResponse {
        has_subscription: subscription.is_some(),
        subscription,
    }))
}

/// POST /api/v1/subscription/create
///
/// Starts a one-month free trial. 400 `ALREADY_SUBSCRIBED` when an active
/// subscription already exists.
pub async fn handle_create_subscription(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<CreateSubscriptionResponse>, AppError> {
    let user_id = identity.require()?;
    let subscription = create_trial(state.subscriptions.as_ref(), user_id).await?;
    Ok(Json(CreateSubscriptionResponse {
        success: true,
        subscription,
        message: "Subscription created successfully".to_string(),
    }))
}
