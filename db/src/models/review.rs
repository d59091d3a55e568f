//! Persisted code reviews (many per grading key, newest wins), including
//! the serialized review content and the formatted score string.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "code_reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub repo_name: String,
    pub branch_name: String,
    pub student_name: Option<String>,

    /// Serialized JSON: `{feedback, results, summary}`.
    pub review_content: String,
    /// `"achieved/max"` score string.
    pub score: String,
    pub status: ReviewStatus,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ReviewStatus {
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COMPLETED" => Ok(ReviewStatus::Completed),
            other => Err(format!("invalid ReviewStatus: {other}")),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
    /// Create a new review record for a grading key.
    pub async fn create_review(
        db: &DatabaseConnection,
        repo_name: &str,
        branch_name: &str,
        student_name: Option<&str>,
        score: &str,
        review_content: &str,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            repo_name: Set(repo_name.to_string()),
            branch_name: Set(branch_name.to_string()),
            student_name: Set(student_name.map(str::to_string)),
            review_content: Set(review_content.to_string()),
            score: Set(score.to_string()),
            status: Set(ReviewStatus::Completed),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Latest (most recent) review for a grading key. A `None` student is a
    /// key component of its own, not a wildcard.
    pub async fn find_latest(
        db: &DatabaseConnection,
        repo_name: &str,
        branch_name: &str,
        student_name: Option<&str>,
    ) -> Result<Option<Model>, DbErr> {
        let mut query = Entity::find()
            .filter(Column::RepoName.eq(repo_name))
            .filter(Column::BranchName.eq(branch_name));

        query = match student_name {
            Some(student) => query.filter(Column::StudentName.eq(student)),
            None => query.filter(Column::StudentName.is_null()),
        };

        query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }

    /// All reviews for a grading key (newest first).
    pub async fn list_for_key(
        db: &DatabaseConnection,
        repo_name: &str,
        branch_name: &str,
        student_name: Option<&str>,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find()
            .filter(Column::RepoName.eq(repo_name))
            .filter(Column::BranchName.eq(branch_name));

        query = match student_name {
            Some(student) => query.filter(Column::StudentName.eq(student)),
            None => query.filter(Column::StudentName.is_null()),
        };

        query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }
}
