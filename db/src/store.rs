//! SeaORM-backed implementation of the grader's review store.
//!
//! The orchestrator is written against `grader::store::ReviewStore`; this
//! adapter maps between the entity row (content as serialized JSON) and the
//! grader's typed record at the persistence boundary.

use crate::models::review::{Entity as ReviewEntity, Model as ReviewModel};
use async_trait::async_trait;
use grader::error::GraderError;
use grader::store::{NewReview, ReviewRecord, ReviewStatus, ReviewStore};
use grader::types::CacheKey;
use sea_orm::DatabaseConnection;

/// Review store backed by the `code_reviews` table.
#[derive(Clone)]
pub struct DbReviewStore {
    db: DatabaseConnection,
}

impl DbReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_record(model: ReviewModel) -> Result<ReviewRecord, GraderError> {
    let content = serde_json::from_str(&model.review_content).map_err(|e| {
        GraderError::Persistence(format!(
            "stored review {} has undecodable content: {e}",
            model.id
        ))
    })?;
    Ok(ReviewRecord {
        id: model.id,
        repository: model.repo_name,
        branch: model.branch_name,
        student: model.student_name,
        score: model.score,
        status: ReviewStatus::Completed,
        content,
        created_at: model.created_at,
    })
}

#[async_trait]
impl ReviewStore for DbReviewStore {
    async fn find_latest(&self, key: &CacheKey) -> Result<Option<ReviewRecord>, GraderError> {
        let model = ReviewEntity::find_latest(
            &self.db,
            &key.repository,
            &key.branch,
            key.student.as_deref(),
        )
        .await
        .map_err(|e| GraderError::Persistence(e.to_string()))?;

        model.map(into_record).transpose()
    }

    async fn insert(&self, review: NewReview) -> Result<ReviewRecord, GraderError> {
        let content = serde_json::to_string(&review.content)
            .map_err(|e| GraderError::Persistence(format!("failed to encode review content: {e}")))?;

        let model = ReviewEntity::create_review(
            &self.db,
            &review.repository,
            &review.branch,
            review.student.as_deref(),
            &review.score,
            &content,
        )
        .await
        .map_err(|e| GraderError::Persistence(e.to_string()))?;

        into_record(model)
    }
}
