use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subscription_type: String,
    pub subscription_status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl SubscriptionRow {
    /// Active-and-unexpired check. Expiry is derived at read time; no row
    /// is ever written back to an expired status.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.subscription_status == crate::subscription::entitlement::STATUS_ACTIVE
            && self.end_date >= now
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn row(status: &str, end_offset: Duration) -> SubscriptionRow {
        let now = Utc::now();
        SubscriptionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            subscription_type: "free_trial".to_string(),
            subscription_status: status.to_string(),
            start_date: now - Duration::days(1),
            end_date: now + end_offset,
        }
    }

    #[test]
    fn test_active_unexpired_row_is_active() {
        let sub = row("active", Duration::days(10));
        assert!(sub.is_active(Utc::now()));
    }

    #[test]
    fn test_expired_row_is_not_active() {
        let sub = row("active", Duration::days(-1));
        assert!(!sub.is_active(Utc::now()));
    }

    #[test]
    fn test_inactive_status_is_not_active() {
        let sub = row("inactive", Duration::days(10));
        assert!(!sub.is_active(Utc::now()));
    }
}
