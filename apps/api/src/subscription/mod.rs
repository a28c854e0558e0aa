//! Subscription lifecycle: the entitlement state machine and its endpoints.

pub mod entitlement;
pub mod handlers;
