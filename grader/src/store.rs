//! Review persistence interface.
//!
//! The orchestrator only ever sees the [`ReviewStore`] trait; the production
//! implementation lives in the `db` crate on top of SeaORM, and
//! [`MemoryReviewStore`] backs tests. Records are append-only from the
//! pipeline's perspective: there is no update or delete operation, and lookup
//! always selects the most recent record for a key.

use crate::error::GraderError;
use crate::summary::ReviewSummary;
use crate::types::CacheKey;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Review lifecycle state. Records are only ever written once complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[serde(rename = "COMPLETED")]
    Completed,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Completed => f.write_str("COMPLETED"),
        }
    }
}

/// Detailed scoring results, persisted inside the review content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub score: f64,
    pub max_score: f64,
    pub completeness: f64,
    pub passed: Vec<String>,
    pub errors: Vec<String>,
}

/// The structured payload of one review: feedback text, detailed results and
/// the derived summary. Serialized as JSON in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewContent {
    pub feedback: String,
    pub results: ScoreBreakdown,
    pub summary: ReviewSummary,
}

/// A persisted review. Created exactly once per unique key on a cache miss
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub id: i64,
    pub repository: String,
    pub branch: String,
    pub student: Option<String>,
    /// `"achieved/max"` score string.
    pub score: String,
    pub status: ReviewStatus,
    pub content: ReviewContent,
    pub created_at: DateTime<Utc>,
}

/// A review about to be inserted; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub repository: String,
    pub branch: String,
    pub student: Option<String>,
    pub score: String,
    pub status: ReviewStatus,
    pub content: ReviewContent,
}

impl ReviewRecord {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.repository.clone(), self.branch.clone(), self.student.clone())
    }
}

/// Keyed, append-only storage for completed reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Most recent record for `key`, by creation time (id as tiebreak).
    async fn find_latest(&self, key: &CacheKey) -> Result<Option<ReviewRecord>, GraderError>;

    /// Persist a new record, assigning its id and creation time.
    async fn insert(&self, review: NewReview) -> Result<ReviewRecord, GraderError>;
}

/// In-memory store used by tests and as the substitution seam for the
/// injected-store design.
#[derive(Default)]
pub struct MemoryReviewStore {
    records: Mutex<Vec<ReviewRecord>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held (history included).
    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn find_latest(&self, key: &CacheKey) -> Result<Option<ReviewRecord>, GraderError> {
        let records = self.records.lock().expect("store lock poisoned");
        Ok(records
            .iter()
            .filter(|r| r.key() == *key)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn insert(&self, review: NewReview) -> Result<ReviewRecord, GraderError> {
        let mut records = self.records.lock().expect("store lock poisoned");
        let record = ReviewRecord {
            id: records.len() as i64 + 1,
            repository: review.repository,
            branch: review.branch,
            student: review.student,
            score: review.score,
            status: review.status,
            content: review.content,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::summarize;

    fn content(score: f64) -> ReviewContent {
        ReviewContent {
            feedback: "feedback".into(),
            results: ScoreBreakdown {
                score,
                max_score: 100.0,
                completeness: 40.0,
                passed: vec![],
                errors: vec![],
            },
            summary: summarize(score, 100.0),
        }
    }

    fn new_review(student: Option<&str>, score: f64) -> NewReview {
        NewReview {
            repository: "https://github.com/org/repo".into(),
            branch: "module-02".into(),
            student: student.map(str::to_string),
            score: format!("{score}/100"),
            status: ReviewStatus::Completed,
            content: content(score),
        }
    }

    #[tokio::test]
    async fn find_latest_returns_the_newest_record_for_a_key() {
        let store = MemoryReviewStore::new();
        let key = CacheKey::new("https://github.com/org/repo", "module-02", None);

        store.insert(new_review(None, 60.0)).await.unwrap();
        let second = store.insert(new_review(None, 80.0)).await.unwrap();

        let latest = store.find_latest(&key).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.score, "80/100");
    }

    #[tokio::test]
    async fn keys_with_different_students_do_not_collide() {
        let store = MemoryReviewStore::new();
        store.insert(new_review(Some("alice"), 90.0)).await.unwrap();

        let anon_key = CacheKey::new("https://github.com/org/repo", "module-02", None);
        assert!(store.find_latest(&anon_key).await.unwrap().is_none());

        let alice_key = CacheKey::new(
            "https://github.com/org/repo",
            "module-02",
            Some("alice".to_string()),
        );
        assert!(store.find_latest(&alice_key).await.unwrap().is_some());
    }

    #[test]
    fn content_round_trips_through_json() {
        let original = content(85.0);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: ReviewContent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }
}
