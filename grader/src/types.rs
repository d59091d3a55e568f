//! Shared data types for the grading pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Input envelope for one grading invocation.
///
/// `repository`, `branch` and `student` together form the cache key; the
/// rubric is deliberately not part of it, so a changed rubric does not
/// invalidate an existing review.
#[derive(Debug, Clone)]
pub struct GradingRequest {
    /// Hosting-provider URL of the submission repository.
    pub repository: String,
    /// Branch identifying the assignment/module being graded.
    pub branch: String,
    /// Student identity; `None` means an anonymous submission and is a
    /// valid cache-key component in its own right.
    pub student: Option<String>,
    /// Grading instructions. Only required when the request misses the cache.
    pub rubric: Option<Rubric>,
}

/// Where the grading instructions for a cache miss come from.
///
/// The two variants replace what used to be parallel code paths: explicit
/// free-form instructions supplied by the caller, and the legacy behavior of
/// routing on the branch label alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rubric {
    /// Free-form rubric text supplied with the request.
    Custom(String),
    /// Derive a default rubric from the branch label (webhook path).
    ModuleDefault,
}

/// The `(repository, branch, student)` triple a review is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub repository: String,
    pub branch: String,
    pub student: Option<String>,
}

impl CacheKey {
    pub fn new(repository: impl Into<String>, branch: impl Into<String>, student: Option<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: branch.into(),
            student,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({})",
            self.repository,
            self.branch,
            self.student.as_deref().unwrap_or("anonymous")
        )
    }
}

/// Whether a returned review came from the store or from a fresh computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    New,
}

impl Provenance {
    /// The wire-level `source` tag the grading endpoint reports.
    pub fn as_source(&self) -> &'static str {
        match self {
            Provenance::Cache => "database",
            Provenance::New => "openai",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_distinguishes_anonymous_from_named() {
        let anon = CacheKey::new("https://github.com/org/repo", "module-02", None);
        let named = CacheKey::new(
            "https://github.com/org/repo",
            "module-02",
            Some("alice".to_string()),
        );
        assert_ne!(anon, named);
        assert_eq!(
            anon,
            CacheKey::new("https://github.com/org/repo", "module-02", None)
        );
    }

    #[test]
    fn provenance_source_tags() {
        assert_eq!(Provenance::Cache.as_source(), "database");
        assert_eq!(Provenance::New.as_source(), "openai");
    }
}
