//! HTTP route entry points.
//!
//! Route groups:
//! - `/health` → Health check endpoint (public, consumed by the dashboard).
//! - `/grade` → Direct grading endpoint (JSON request/response).
//! - `/webhook` → Hosting-provider event ingestion (push events).

use crate::routes::{grade::grade_routes, health::health_routes, webhook::webhook_routes};
use crate::state::AppState;
use axum::Router;

pub mod grade;
pub mod health;
pub mod webhook;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router has all route groups mounted under their base paths
/// with `AppState` already applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/grade", grade_routes())
        .nest("/webhook", webhook_routes())
        .with_state(app_state)
}
