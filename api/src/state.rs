//! Application state container shared across Axum route handlers.
//!
//! This struct holds shared resources: the database connection and the
//! grading service. It is cheap to clone and passed into route handlers via
//! Axum's `State<T>` extractor.

use grader::orchestrator::GradingService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Central application state shared across the server.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    grader: Arc<GradingService>,
}

impl AppState {
    /// Creates a new `AppState` with the given database connection and
    /// grading service.
    pub fn new(db: DatabaseConnection, grader: Arc<GradingService>) -> Self {
        Self { db, grader }
    }

    /// Returns a shared reference to the internal `DatabaseConnection`.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns a shared handle to the grading service.
    pub fn grader(&self) -> Arc<GradingService> {
        self.grader.clone()
    }
}
