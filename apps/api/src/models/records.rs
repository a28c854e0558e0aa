//! Append-only detection and rewrite records.
//!
//! Rows are inserted once and never mutated. Stored text is truncated to
//! 1000 characters — a storage-size policy only; responses always carry the
//! full text. Storage sits behind the `RecordStore` trait so handlers are
//! testable without a database; inserts are best-effort side effects, so
//! the trait returns `anyhow::Result` and callers log-and-continue.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::detection::pipeline::DetectionReport;

/// Max characters of text persisted per record column.
pub const STORED_TEXT_LIMIT: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DetectionRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub score: f64,
    pub result: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RewriteRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_text: String,
    pub rewritten_text: String,
    pub detection_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Storage seam for detection and rewrite records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_detection(
        &self,
        user_id: Uuid,
        content: &str,
        report: &DetectionReport,
    ) -> Result<DetectionRecordRow>;

    async fn insert_rewrite(
        &self,
        user_id: Uuid,
        original_text: &str,
        rewritten_text: &str,
        detection_id: Option<Uuid>,
    ) -> Result<RewriteRecordRow>;

    /// Overall score of a prior detection owned by `user_id`.
    async fn detection_score(&self, detection_id: Uuid, user_id: Uuid) -> Result<Option<f64>>;
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_detection(
        &self,
        user_id: Uuid,
        content: &str,
        report: &DetectionReport,
    ) -> Result<DetectionRecordRow> {
        let row = sqlx::query_as::<_, DetectionRecordRow>(
            r#"
            INSERT INTO detection_records (user_id, content, score, result)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(truncate_for_storage(content))
        .bind(report.overall_score)
        .bind(serde_json::to_value(report)?)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_rewrite(
        &self,
        user_id: Uuid,
        original_text: &str,
        rewritten_text: &str,
        detection_id: Option<Uuid>,
    ) -> Result<RewriteRecordRow> {
        let row = sqlx::query_as::<_, RewriteRecordRow>(
            r#"
            INSERT INTO rewrite_records (user_id, original_text, rewritten_text, detection_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(truncate_for_storage(original_text))
        .bind(truncate_for_storage(rewritten_text))
        .bind(detection_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn detection_score(&self, detection_id: Uuid, user_id: Uuid) -> Result<Option<f64>> {
        let row: Option<(f64,)> =
            sqlx::query_as("SELECT score FROM detection_records WHERE id = $1 AND user_id = $2")
                .bind(detection_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(score,)| score))
    }
}

/// First `STORED_TEXT_LIMIT` characters, char-boundary safe.
fn truncate_for_storage(text: &str) -> &str {
    match text.char_indices().nth(STORED_TEXT_LIMIT) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// In-memory `RecordStore` for handler tests.
#[cfg(test)]
pub(crate) struct MemoryRecordStore {
    pub(crate) detections: std::sync::Mutex<Vec<DetectionRecordRow>>,
    pub(crate) rewrites: std::sync::Mutex<Vec<RewriteRecordRow>>,
}

#[cfg(test)]
impl MemoryRecordStore {
    pub(crate) fn new() -> Self {
        Self {
            detections: std::sync::Mutex::new(Vec::new()),
            rewrites: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_detection(
        &self,
        user_id: Uuid,
        content: &str,
        report: &DetectionReport,
    ) -> Result<DetectionRecordRow> {
        let row = DetectionRecordRow {
            id: Uuid::new_v4(),
            user_id,
            content: truncate_for_storage(content).to_string(),
            score: report.overall_score,
            result: serde_json::to_value(report)?,
            created_at: Utc::now(),
        };
        self.detections.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn insert_rewrite(
        &self,
        user_id: Uuid,
        original_text: &str,
        rewritten_text: &str,
        detection_id: Option<Uuid>,
    ) -> Result<RewriteRecordRow> {
        let row = RewriteRecordRow {
            id: Uuid::new_v4(),
            user_id,
            original_text: truncate_for_storage(original_text).to_string(),
            rewritten_text: truncate_for_storage(rewritten_text).to_string(),
            detection_id,
            created_at: Utc::now(),
        };
        self.rewrites.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn detection_score(&self, detection_id: Uuid, user_id: Uuid) -> Result<Option<f64>> {
        Ok(self
            .detections
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == detection_id && r.user_id == user_id)
            .map(|r| r.score))
    }
}

/// `RecordStore` whose every operation fails — for asserting the
/// log-and-continue persistence policy.
#[cfg(test)]
pub(crate) struct FailingRecordStore;

#[cfg(test)]
#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn insert_detection(
        &self,
        _user_id: Uuid,
        _content: &str,
        _report: &DetectionReport,
    ) -> Result<DetectionRecordRow> {
        Err(anyhow::anyhow!("record store unavailable"))
    }

    async fn insert_rewrite(
        &self,
        _user_id: Uuid,
        _original_text: &str,
        _rewritten_text: &str,
        _detection_id: Option<Uuid>,
    ) -> Result<RewriteRecordRow> {
        Err(anyhow::anyhow!("record store unavailable"))
    }

    async fn detection_score(&self, _detection_id: Uuid, _user_id: Uuid) -> Result<Option<f64>> {
        Err(anyhow::anyhow!("record store unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_for_storage("hello"), "hello");
    }

    #[test]
    fn test_long_text_truncated_to_limit() {
        let text = "x".repeat(STORED_TEXT_LIMIT + 500);
        let stored = truncate_for_storage(&text);
        assert_eq!(stored.chars().count(), STORED_TEXT_LIMIT);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(STORED_TEXT_LIMIT + 10);
        let stored = truncate_for_storage(&text);
        assert_eq!(stored.chars().count(), STORED_TEXT_LIMIT);
        assert!(stored.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_exactly_at_limit_untouched() {
        let text = "y".repeat(STORED_TEXT_LIMIT);
        assert_eq!(truncate_for_storage(&text), text);
    }

    #[tokio::test]
    async fn test_memory_store_truncates_like_postgres() {
        let store = MemoryRecordStore::new();
        let long = "z".repeat(STORED_TEXT_LIMIT + 50);
        let report = DetectionReport {
            overall_score: 70.0,
            sentences: vec![],
        };
        let row = store
            .insert_detection(Uuid::new_v4(), &long, &report)
            .await
            .unwrap();
        assert_eq!(row.content.chars().count(), STORED_TEXT_LIMIT);
    }
}
