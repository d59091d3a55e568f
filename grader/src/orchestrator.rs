//! The grading pipeline controller.
//!
//! One [`GradingService`] owns the injected store, the scoring strategy and
//! the workspace manager, and drives a request through: validate, cache
//! lookup, acquire, scan, score, persist. Identical keys are scored by the
//! external service at most once — the cache hit path performs no filesystem
//! or network work at all. Simultaneous first-time requests for one key are
//! serialized through a per-key advisory lock so the scoring cost is paid
//! once even under a race.

use crate::error::GraderError;
use crate::scanner;
use crate::scoring::ScoreEngine;
use crate::store::{NewReview, ReviewContent, ReviewRecord, ReviewStatus, ReviewStore, ScoreBreakdown};
use crate::summary::{self, MAX_SCORE};
use crate::types::{CacheKey, GradingRequest, Provenance, Rubric};
use crate::workspace::{WorkspaceManager, is_valid_repository_reference};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Submitter label used for workspace naming when no student is given.
const ANONYMOUS_LABEL: &str = "anonymous";

/// A review plus where it came from.
#[derive(Debug, Clone)]
pub struct GradedReview {
    pub record: ReviewRecord,
    pub provenance: Provenance,
}

/// The pipeline controller for grading requests.
pub struct GradingService {
    store: Arc<dyn ReviewStore>,
    scorer: Arc<dyn ScoreEngine>,
    workspaces: WorkspaceManager,
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl GradingService {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        scorer: Arc<dyn ScoreEngine>,
        workspaces: WorkspaceManager,
    ) -> Self {
        Self {
            store,
            scorer,
            workspaces,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Grade one submission.
    ///
    /// Returns the stored record verbatim on a cache hit; otherwise runs the
    /// full pipeline and persists a new record. The workspace created for a
    /// miss is released on every exit path, including scoring and persistence
    /// failures.
    pub async fn grade(&self, request: &GradingRequest) -> Result<GradedReview, GraderError> {
        let repository = request.repository.trim();
        if repository.is_empty() {
            return Err(GraderError::Validation(
                "repository reference is required".to_string(),
            ));
        }
        let branch = request.branch.trim();
        if branch.is_empty() {
            return Err(GraderError::Validation("branch name is required".to_string()));
        }

        let key = CacheKey::new(repository, branch, request.student.clone());

        if let Some(record) = self.store.find_latest(&key).await? {
            tracing::info!(key = %key, review_id = record.id, "serving review from store");
            return Ok(GradedReview {
                record,
                provenance: Provenance::Cache,
            });
        }

        // Miss path: the rubric becomes mandatory, and the reference must
        // look like a real hosting-provider URL before we try to clone it.
        let instructions = resolve_rubric(request)?;
        if !is_valid_repository_reference(repository) {
            return Err(GraderError::Validation(format!(
                "unrecognized repository reference: {repository}"
            )));
        }

        let key_lock = self.key_lock(&key).await;
        let guard = key_lock.lock().await;

        // Double-check after winning the lock: a concurrent first request
        // may have completed while we waited.
        let result = match self.store.find_latest(&key).await {
            Ok(Some(record)) => {
                tracing::info!(key = %key, review_id = record.id, "review computed by concurrent request");
                Ok(GradedReview {
                    record,
                    provenance: Provenance::Cache,
                })
            }
            Ok(None) => self.grade_uncached(&key, &instructions).await,
            Err(e) => Err(e),
        };

        drop(guard);
        self.forget_key_lock(&key).await;
        result
    }

    /// The miss path: acquire, scan, score, persist. Caller holds the
    /// per-key lock.
    async fn grade_uncached(
        &self,
        key: &CacheKey,
        instructions: &str,
    ) -> Result<GradedReview, GraderError> {
        let label = key.student.as_deref().unwrap_or(ANONYMOUS_LABEL);
        let workspace = self
            .workspaces
            .acquire(&key.repository, label, &key.branch)
            .await?;

        let outcome = self.score_and_persist(key, instructions, workspace.path()).await;

        // Explicit release on the success and failure paths alike; the drop
        // guard inside Workspace covers panics and cancellation.
        workspace.release();

        outcome.map(|record| GradedReview {
            record,
            provenance: Provenance::New,
        })
    }

    async fn score_and_persist(
        &self,
        key: &CacheKey,
        instructions: &str,
        workspace_path: &std::path::Path,
    ) -> Result<ReviewRecord, GraderError> {
        let files = scanner::scan(workspace_path)
            .map_err(|e| GraderError::Acquisition(format!("failed to scan workspace: {e}")))?;
        if files.is_empty() {
            return Err(GraderError::EmptyCorpus);
        }

        let corpus = scanner::concatenate(&files);
        tracing::info!(key = %key, files = files.len(), "scoring submission corpus");

        let report = self.scorer.score(&corpus, instructions, &key.branch).await?;
        let summary = summary::summarize(report.score, MAX_SCORE);

        let record = self
            .store
            .insert(NewReview {
                repository: key.repository.clone(),
                branch: key.branch.clone(),
                student: key.student.clone(),
                score: summary.score.clone(),
                status: ReviewStatus::Completed,
                content: ReviewContent {
                    feedback: report.feedback,
                    results: ScoreBreakdown {
                        score: report.score,
                        max_score: MAX_SCORE,
                        completeness: report.completeness,
                        passed: report.passed,
                        errors: report.errors,
                    },
                    summary,
                },
            })
            .await?;

        tracing::info!(key = %key, review_id = record.id, score = %record.score, "review persisted");
        Ok(record)
    }

    async fn key_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        let mut map = self.in_flight.lock().await;
        map.entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the advisory lock entry once no other request holds it, so the
    /// map doesn't grow with every key ever graded.
    async fn forget_key_lock(&self, key: &CacheKey) {
        let mut map = self.in_flight.lock().await;
        if let Some(entry) = map.get(key) {
            // two strong refs left means the map's own plus our caller's
            if Arc::strong_count(entry) <= 2 {
                map.remove(key);
            }
        }
    }
}

fn resolve_rubric(request: &GradingRequest) -> Result<String, GraderError> {
    match &request.rubric {
        Some(Rubric::Custom(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(Rubric::Custom(_)) => Err(GraderError::Validation(
            "grading instructions must not be empty".to_string(),
        )),
        Some(Rubric::ModuleDefault) => Ok(default_rubric(&request.branch)),
        None => Err(GraderError::Validation(
            "grading instructions are required for a first-time review".to_string(),
        )),
    }
}

/// The legacy module-routing behavior: a rubric derived from the branch
/// label alone, used by the webhook path where no instructions arrive.
fn default_rubric(branch: &str) -> String {
    format!(
        "Grade this submission for the assignment \"{}\". Assess correctness, \
         code quality, structure, and completeness against common expectations \
         for the assignment, and justify every deduction in the feedback.",
        branch.trim()
    )
}
