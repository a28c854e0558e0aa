use std::sync::Arc;

use crate::detection::scoring::ScoringPolicy;
use crate::models::records::RecordStore;
use crate::subscription::entitlement::SubscriptionStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything sits behind trait objects: the scorer so a real classifier
/// can replace the placeholder, the stores so handlers are testable
/// against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable detection scorer. Default: UniformScorer.
    pub scorer: Arc<dyn ScoringPolicy>,
    /// Subscription rows backing the entitlement state machine.
    pub subscriptions: Arc<dyn SubscriptionStore>,
    /// Append-only detection/rewrite records (best-effort side channel).
    pub records: Arc<dyn RecordStore>,
}
