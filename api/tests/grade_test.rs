mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn grade_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/grade")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn missing_required_fields_return_a_validation_failure() {
    let app = helpers::make_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(grade_request(json!({ "branchName": "module-02" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["timestamp"].is_string());

    let response = app
        .router
        .clone()
        .oneshot(grade_request(json!({
            "repoName": "https://github.com/org/repo"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn first_time_requests_need_instructions() {
    let app = helpers::make_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(grade_request(json!({
            "repoName": "https://github.com/org/repo",
            "branchName": "module-02",
            "studentName": "alice"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn malformed_repository_urls_are_rejected() {
    let app = helpers::make_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(grade_request(json!({
            "repoName": "git@github.com:org/repo.git",
            "branchName": "module-02",
            "customInstructions": "grade for correctness"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn miss_then_hit_flow_reports_its_source() {
    let app = helpers::make_test_app().await;

    let first = app
        .router
        .clone()
        .oneshot(grade_request(json!({
            "repoName": "https://github.com/org/repo",
            "branchName": "module-02",
            "studentName": "alice",
            "customInstructions": "grade for correctness"
        })))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let first_body = response_json(first).await;
    assert_eq!(first_body["success"], true);
    assert_eq!(first_body["source"], "openai");
    assert_eq!(first_body["student"], "alice");
    assert_eq!(first_body["branch"], "module-02");
    assert_eq!(first_body["repository"], "https://github.com/org/repo");
    assert_eq!(first_body["summary"]["score"], "88/100");
    assert_eq!(first_body["summary"]["status"], "Good");
    assert_eq!(first_body["results"]["score"], 88.0);
    assert_eq!(first_body["results"]["completeness"], 40.0);
    let review_id = first_body["reviewId"].as_i64().unwrap();

    // identical key, no instructions this time: served from the store
    let second = app
        .router
        .clone()
        .oneshot(grade_request(json!({
            "repoName": "https://github.com/org/repo",
            "branchName": "module-02",
            "studentName": "alice"
        })))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let second_body = response_json(second).await;
    assert_eq!(second_body["source"], "database");
    assert_eq!(second_body["reviewId"].as_i64().unwrap(), review_id);
    assert_eq!(second_body["summary"], first_body["summary"]);
    assert_eq!(second_body["createdAt"], first_body["createdAt"]);

    // no checkout may outlive its request
    assert_eq!(
        std::fs::read_dir(app.workspace_root.path()).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn a_changed_rubric_does_not_invalidate_the_cache() {
    let app = helpers::make_test_app().await;

    let base = json!({
        "repoName": "https://github.com/org/repo",
        "branchName": "module-02",
        "studentName": "alice",
        "customInstructions": "grade for correctness"
    });
    let first = app
        .router
        .clone()
        .oneshot(grade_request(base))
        .await
        .unwrap();
    let first_body = response_json(first).await;

    let second = app
        .router
        .clone()
        .oneshot(grade_request(json!({
            "repoName": "https://github.com/org/repo",
            "branchName": "module-02",
            "studentName": "alice",
            "customInstructions": "grade only documentation"
        })))
        .await
        .unwrap();
    let second_body = response_json(second).await;

    assert_eq!(second_body["source"], "database");
    assert_eq!(second_body["reviewId"], first_body["reviewId"]);
    assert_eq!(second_body["results"], first_body["results"]);
}
