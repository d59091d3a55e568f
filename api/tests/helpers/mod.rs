//! Shared setup for API integration tests.
//!
//! Builds the real router on top of an in-memory SQLite store, with the
//! network-facing seams (repository fetching, AI scoring) replaced by stubs.

use api::{routes::routes, state::AppState};
use async_trait::async_trait;
use axum::Router;
use db::store::DbReviewStore;
use grader::error::GraderError;
use grader::orchestrator::GradingService;
use grader::scoring::{ScoreEngine, ScoreReport, completeness_score};
use grader::workspace::{SourceFetcher, WorkspaceManager};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Writes a small source tree instead of cloning anything.
pub struct FixtureFetcher;

#[async_trait]
impl SourceFetcher for FixtureFetcher {
    async fn fetch(&self, _repo: &str, _branch: &str, dest: &Path) -> Result<(), GraderError> {
        fs::create_dir_all(dest).unwrap();
        fs::write(dest.join("index.js"), "console.log('submission');").unwrap();
        Ok(())
    }
}

/// Returns a fixed assessment without talking to any service.
pub struct StubScorer {
    pub score: f64,
}

#[async_trait]
impl ScoreEngine for StubScorer {
    async fn score(
        &self,
        _corpus: &str,
        _instructions: &str,
        _branch_label: &str,
    ) -> Result<ScoreReport, GraderError> {
        Ok(ScoreReport {
            score: self.score,
            feedback: "Clear structure, minor style issues.".into(),
            passed: vec!["builds".into()],
            errors: vec![],
            completeness: completeness_score(self.score),
        })
    }
}

/// A running test application. Holds the workspace root tempdir so checkout
/// paths stay valid for the router's lifetime.
pub struct TestApp {
    pub router: Router,
    pub workspace_root: TempDir,
}

pub async fn make_test_app() -> TestApp {
    let db = db::test_utils::setup_test_db().await;

    let workspace_root = TempDir::new().expect("Failed to create workspace root");
    let grader = Arc::new(GradingService::new(
        Arc::new(DbReviewStore::new(db.clone())),
        Arc::new(StubScorer { score: 88.0 }),
        WorkspaceManager::new(workspace_root.path()).with_fetcher(FixtureFetcher),
    ));

    TestApp {
        router: routes(AppState::new(db, grader)),
        workspace_root,
    }
}
