//! The direct grading endpoint.

use crate::state::AppState;
use axum::{Router, routing::post};

pub mod common;
pub mod post;

pub fn grade_routes() -> Router<AppState> {
    Router::new().route("/", post(post::grade_submission))
}
