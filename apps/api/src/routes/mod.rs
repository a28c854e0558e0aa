pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::detection::handlers::handle_detect;
use crate::rewrite::handlers::handle_rewrite;
use crate::state::AppState;
use crate::subscription::handlers::{handle_check_subscription, handle_create_subscription};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/detect", post(handle_detect))
        .route("/api/v1/rewrite", post(handle_rewrite))
        .route(
            "/api/v1/subscription/check",
            get(handle_check_subscription),
        )
        .route(
            "/api/v1/subscription/create",
            post(handle_create_subscription),
        )
        .with_state(state)
}
