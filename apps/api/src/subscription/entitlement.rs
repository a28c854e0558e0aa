//! Entitlement state machine.
//!
//! Per-user states are derived, never stored: `NoSubscription → Active →
//! Expired`. Only "has an active, unexpired row" is ever queried, so
//! Expired and NoSubscription are indistinguishable to callers. Expired
//! rows accumulate as append-only history; re-entry after expiry is the
//! same create transition.
//!
//! The create precondition is check-then-insert. The store carries a
//! partial unique index on `(user_id) WHERE subscription_status = 'active'`,
//! so two concurrent creates degrade to one success and one
//! `AlreadySubscribed`, never duplicate active rows. Because expiry is
//! read-time derived, rows past their end date still carry the active
//! status; the insert retires those first so the index never blocks
//! re-entry.
//!
//! Storage sits behind the `SubscriptionStore` trait — same seam pattern
//! as `ScoringPolicy` — so the transitions are testable without a
//! database.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::subscription::SubscriptionRow;

pub const TRIAL_TYPE: &str = "free_trial";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

/// Storage seam for subscription rows. `PgSubscriptionStore` is the
/// production implementation; tests use an in-memory fake.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// The user's active, unexpired row, if any.
    async fn find_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SubscriptionRow>, AppError>;

    /// Appends a new active row. Stale active rows (past their end date)
    /// are retired first so re-entry is never blocked; a concurrent
    /// duplicate hits the partial unique index and surfaces as
    /// `AlreadySubscribed`.
    async fn insert_active(
        &self,
        user_id: Uuid,
        subscription_type: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<SubscriptionRow, AppError>;
}

pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn find_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SubscriptionRow>, AppError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT * FROM subscriptions
            WHERE user_id = $1 AND subscription_status = $2 AND end_date >= $3
            ORDER BY end_date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_active(
        &self,
        user_id: Uuid,
        subscription_type: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<SubscriptionRow, AppError> {
        let mut tx = self.pool.begin().await?;

        // Expired rows still carry the active status (expiry is derived at
        // read time). Retire them inside the transaction so the partial
        // unique index only ever rejects a genuinely concurrent create.
        sqlx::query(
            r#"
            UPDATE subscriptions SET subscription_status = $1
            WHERE user_id = $2 AND subscription_status = $3 AND end_date < $4
            "#,
        )
        .bind(STATUS_INACTIVE)
        .bind(user_id)
        .bind(STATUS_ACTIVE)
        .bind(start_date)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions
                (user_id, subscription_type, subscription_status, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(subscription_type)
        .bind(STATUS_ACTIVE)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::AlreadySubscribed,
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;
        Ok(row)
    }
}

/// Returns the user's active, unexpired subscription if one exists.
pub async fn find_active(
    store: &dyn SubscriptionStore,
    user_id: Uuid,
) -> Result<Option<SubscriptionRow>, AppError> {
    store.find_active(user_id, Utc::now()).await
}

/// Authorization gate for the rewrite capability.
pub async fn require_active(
    store: &dyn SubscriptionStore,
    user_id: Uuid,
) -> Result<SubscriptionRow, AppError> {
    find_active(store, user_id)
        .await?
        .ok_or(AppError::EntitlementRequired)
}

/// `NoSubscription → Active` (also re-entry from Expired): inserts a
/// one-month free trial. Rejected with `AlreadySubscribed` when an active,
/// unexpired row already exists — either via the precondition check or via
/// the store's uniqueness guarantee when a concurrent create slips past it.
pub async fn create_trial(
    store: &dyn SubscriptionStore,
    user_id: Uuid,
) -> Result<SubscriptionRow, AppError> {
    if find_active(store, user_id).await?.is_some() {
        return Err(AppError::AlreadySubscribed);
    }

    let (start_date, end_date) = trial_window(Utc::now())?;
    store
        .insert_active(user_id, TRIAL_TYPE, start_date, end_date)
        .await
}

/// Trial validity: one calendar month from `now`.
fn trial_window(now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let end = now
        .checked_add_months(Months::new(1))
        .ok_or_else(|| AppError::Internal(anyhow!("subscription end date overflow")))?;
    Ok((now, end))
}

/// In-memory `SubscriptionStore` mirroring the Postgres semantics:
/// read-time expiry, stale-row retirement on insert, and the partial
/// uniqueness guarantee on active rows.
#[cfg(test)]
pub(crate) struct MemorySubscriptionStore {
    rows: std::sync::Mutex<Vec<SubscriptionRow>>,
}

#[cfg(test)]
impl MemorySubscriptionStore {
    pub(crate) fn new() -> Self {
        Self {
            rows: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seed(&self, row: SubscriptionRow) {
        self.rows.lock().unwrap().push(row);
    }

    pub(crate) fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn find_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<SubscriptionRow>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active(now))
            .max_by_key(|r| r.end_date)
            .cloned())
    }

    async fn insert_active(
        &self,
        user_id: Uuid,
        subscription_type: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<SubscriptionRow, AppError> {
        let mut rows = self.rows.lock().unwrap();
        for row in rows.iter_mut() {
            if row.user_id == user_id
                && row.subscription_status == STATUS_ACTIVE
                && row.end_date < start_date
            {
                row.subscription_status = STATUS_INACTIVE.to_string();
            }
        }
        // partial unique index on (user_id) WHERE subscription_status = 'active'
        if rows
            .iter()
            .any(|r| r.user_id == user_id && r.subscription_status == STATUS_ACTIVE)
        {
            return Err(AppError::AlreadySubscribed);
        }
        let row = SubscriptionRow {
            id: Uuid::new_v4(),
            user_id,
            subscription_type: subscription_type.to_string(),
            subscription_status: STATUS_ACTIVE.to_string(),
            start_date,
            end_date,
        };
        rows.push(row.clone());
        Ok(row)
    }
}
