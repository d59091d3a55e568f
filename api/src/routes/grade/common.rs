//! Request and response shapes for the grading endpoint.
//!
//! These bodies are a fixed wire contract consumed by the dashboard, so they
//! do not use the generic `ApiResponse` envelope.

use chrono::Utc;
use grader::error::GraderError;
use grader::orchestrator::GradedReview;
use grader::store::ReviewContent;
use grader::summary::ReviewSummary;
use grader::types::{GradingRequest, Rubric};
use serde::{Deserialize, Serialize};

/// Request body of `POST /grade`.
///
/// Every field is optional at the serde level so that missing required fields
/// surface as a well-formed 400 validation failure rather than a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub repo_name: Option<String>,
    pub branch_name: Option<String>,
    pub student_name: Option<String>,
    pub custom_instructions: Option<String>,
}

impl GradeRequest {
    /// Translate the wire shape into the orchestrator's input contract.
    /// A blank student name counts as anonymous.
    pub fn into_grading_request(self) -> GradingRequest {
        GradingRequest {
            repository: self.repo_name.unwrap_or_default(),
            branch: self.branch_name.unwrap_or_default(),
            student: self.student_name.filter(|s| !s.trim().is_empty()),
            rubric: self.custom_instructions.map(Rubric::Custom),
        }
    }
}

/// Detailed results portion of the success body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResults {
    pub feedback: String,
    pub score: f64,
    pub max_score: f64,
    pub completeness: f64,
    pub passed: Vec<String>,
    pub errors: Vec<String>,
}

impl From<&ReviewContent> for GradeResults {
    fn from(content: &ReviewContent) -> Self {
        Self {
            feedback: content.feedback.clone(),
            score: content.results.score,
            max_score: content.results.max_score,
            completeness: content.results.completeness,
            passed: content.results.passed.clone(),
            errors: content.results.errors.clone(),
        }
    }
}

/// Success body of `POST /grade`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSuccessBody {
    pub success: bool,
    /// `"database"` for a cache hit, `"openai"` for a fresh computation.
    pub source: &'static str,
    pub student: Option<String>,
    pub branch: String,
    pub repository: String,
    pub results: GradeResults,
    pub summary: ReviewSummary,
    pub review_id: i64,
    pub created_at: String,
    pub timestamp: String,
}

impl GradeSuccessBody {
    pub fn from_graded(graded: GradedReview) -> Self {
        let record = graded.record;
        Self {
            success: true,
            source: graded.provenance.as_source(),
            student: record.student.clone(),
            branch: record.branch.clone(),
            repository: record.repository.clone(),
            results: GradeResults::from(&record.content),
            summary: record.content.summary.clone(),
            review_id: record.id,
            created_at: record.created_at.to_rfc3339(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Failure body of `POST /grade`.
#[derive(Debug, Serialize)]
pub struct GradeErrorBody {
    pub success: bool,
    /// Stable machine-readable error code.
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: String,
}

impl GradeErrorBody {
    pub fn from_error(err: &GraderError) -> Self {
        Self {
            success: false,
            error: err.code().to_string(),
            message: Some(err.to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
