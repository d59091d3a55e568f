//! GitHub push-event webhook handler.
//!
//! Translates the provider's native event schema into the orchestrator's
//! input contract. Payloads that don't carry a branch push (tag pushes,
//! missing repository data) are rejected before the pipeline is invoked.

use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use grader::types::{GradingRequest, Rubric};
use serde::{Deserialize, Serialize};

/// The subset of a GitHub push event this service cares about.
#[derive(Debug, Deserialize)]
pub struct PushEvent {
    /// Fully qualified git ref, e.g. `refs/heads/module-02`.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub repository: Option<PushRepository>,
    pub pusher: Option<PushAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct PushRepository {
    pub html_url: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PushAuthor {
    pub name: Option<String>,
}

/// Acknowledgement payload returned for a processed push event.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub repository: String,
    pub branch: String,
    pub student: Option<String>,
    pub review_id: i64,
    pub source: &'static str,
}

/// Map a push event onto the orchestrator's input contract, or say why not.
///
/// Pure so it can be tested without a router: branch pushes become grading
/// requests with the module-default rubric; anything else is rejected.
pub fn extract_submission(event: &PushEvent) -> Result<GradingRequest, String> {
    let git_ref = event
        .git_ref
        .as_deref()
        .ok_or_else(|| "payload has no ref".to_string())?;
    let branch = git_ref
        .strip_prefix("refs/heads/")
        .ok_or_else(|| format!("ref {git_ref} is not a branch push"))?;
    if branch.is_empty() {
        return Err("payload has an empty branch name".to_string());
    }

    let repository = event
        .repository
        .as_ref()
        .ok_or_else(|| "payload has no repository".to_string())?;
    let repo_url = match (&repository.html_url, &repository.full_name) {
        (Some(url), _) if !url.is_empty() => url.clone(),
        (_, Some(full_name)) if !full_name.is_empty() => {
            format!("https://github.com/{full_name}")
        }
        _ => return Err("payload has no usable repository URL".to_string()),
    };

    let student = event
        .pusher
        .as_ref()
        .and_then(|p| p.name.clone())
        .filter(|name| !name.trim().is_empty());

    Ok(GradingRequest {
        repository: repo_url,
        branch: branch.to_string(),
        student,
        rubric: Some(Rubric::ModuleDefault),
    })
}

/// POST /webhook/github
///
/// Accepts a GitHub push event and grades the pushed branch. The grading
/// instructions are derived from the branch label (the module-default
/// rubric), so a webhook delivery never needs to carry a rubric of its own.
///
/// ### Responses
/// - `200 OK` with an acknowledgement body on successful dispatch
/// - `400 Bad Request` for malformed payloads (no branch ref, no repository)
/// - `500 Internal Server Error` when the pipeline fails
pub async fn github_webhook(
    State(state): State<AppState>,
    Json(event): Json<PushEvent>,
) -> impl IntoResponse {
    let request = match extract_submission(&event) {
        Ok(request) => request,
        Err(reason) => {
            tracing::warn!(%reason, "rejected webhook payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<WebhookAck>::error(reason)),
            )
                .into_response();
        }
    };

    match state.grader().grade(&request).await {
        Ok(graded) => {
            let ack = WebhookAck {
                repository: graded.record.repository.clone(),
                branch: graded.record.branch.clone(),
                student: graded.record.student.clone(),
                review_id: graded.record.id,
                source: graded.provenance.as_source(),
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(ack, "Webhook processed")),
            )
                .into_response()
        }
        Err(err) => {
            let status = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            tracing::error!(error = %err, "webhook-triggered grading failed");
            (status, Json(ApiResponse::<WebhookAck>::error(err.to_string()))).into_response()
        }
    }
}
