//! Grading endpoint handler.

use crate::routes::grade::common::{GradeErrorBody, GradeRequest, GradeSuccessBody};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// POST /grade
///
/// Grade a submission identified by repository and branch, optionally scoped
/// to a student. A previously graded key is served from the store without
/// touching the repository or the scoring service.
///
/// ### Request Body
/// ```json
/// {
///   "repoName": "https://github.com/org/repo",
///   "branchName": "module-02",
///   "studentName": "alice",
///   "customInstructions": "grade for correctness"
/// }
/// ```
///
/// `customInstructions` is only required the first time a key is graded.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "source": "openai",
///   "student": "alice",
///   "branch": "module-02",
///   "repository": "https://github.com/org/repo",
///   "results": { "feedback": "...", "score": 85.0, "maxScore": 100.0,
///                "completeness": 40.0, "passed": [], "errors": [] },
///   "summary": { "score": "85/100", "percentage": 85.0, "status": "Good" },
///   "reviewId": 1,
///   "createdAt": "2025-08-06T10:00:00+00:00",
///   "timestamp": "2025-08-06T10:00:01+00:00"
/// }
/// ```
///
/// - `400 Bad Request` (missing fields, malformed repository URL, or a
///   first-time request without instructions)
/// ```json
/// {
///   "success": false,
///   "error": "VALIDATION_ERROR",
///   "message": "invalid request: repository reference is required",
///   "timestamp": "2025-08-06T10:00:00+00:00"
/// }
/// ```
///
/// - `500 Internal Server Error` (acquisition, empty corpus, scoring or
///   persistence failure), same failure shape with the matching error code.
pub async fn grade_submission(
    State(state): State<AppState>,
    Json(req): Json<GradeRequest>,
) -> impl IntoResponse {
    let request = req.into_grading_request();

    match state.grader().grade(&request).await {
        Ok(graded) => (
            StatusCode::OK,
            Json(GradeSuccessBody::from_graded(graded)),
        )
            .into_response(),
        Err(err) => {
            let status = if err.is_client_error() {
                tracing::warn!(error = %err, "grading request rejected");
                StatusCode::BAD_REQUEST
            } else {
                tracing::error!(error = %err, "grading pipeline failed");
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(GradeErrorBody::from_error(&err))).into_response()
        }
    }
}
