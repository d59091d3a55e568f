//! Hosting-provider webhook ingestion.

use crate::state::AppState;
use axum::{Router, routing::post};

pub mod post;

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/github", post(post::github_webhook))
}
