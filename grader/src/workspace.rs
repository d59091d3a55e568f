//! Ephemeral workspace acquisition and guaranteed cleanup.
//!
//! Each grading invocation gets its own uniquely named checkout directory
//! under the configured workspace root. The directory name combines the
//! sanitized submitter label, a millisecond timestamp and a random token, so
//! concurrent invocations never collide on the same path, even for the same
//! submitter and branch. Cleanup runs on every exit path: [`Workspace`] is a
//! drop guard, so an early `?`, a panic or a cancelled request all still
//! remove the checkout.

use crate::error::GraderError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static REPOSITORY_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://github\.com/[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+?(?:\.git)?/?$")
        .expect("invalid repository URL pattern")
});

/// Pure syntactic check that `s` looks like a GitHub repository URL.
///
/// Used by request validation and again defensively before attempting a
/// clone; it says nothing about whether the repository actually exists.
pub fn is_valid_repository_reference(s: &str) -> bool {
    REPOSITORY_URL.is_match(s)
}

/// Strategy for materializing a repository branch into a local directory.
///
/// Production uses [`GitFetcher`]; tests substitute implementations that
/// write fixture trees or fail on demand.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, repo_url: &str, branch: &str, dest: &Path) -> Result<(), GraderError>;
}

/// Fetches with the system `git`: a shallow, single-branch clone of exactly
/// the requested branch.
pub struct GitFetcher;

#[async_trait]
impl SourceFetcher for GitFetcher {
    async fn fetch(&self, repo_url: &str, branch: &str, dest: &Path) -> Result<(), GraderError> {
        let output = tokio::process::Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg("--single-branch")
            .arg("--branch")
            .arg(branch)
            .arg(repo_url)
            .arg(dest)
            .output()
            .await
            .map_err(|e| GraderError::Acquisition(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GraderError::Acquisition(format!(
                "git clone of {repo_url}@{branch} failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// An exclusively-owned checkout directory, removed when released or dropped.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the checkout now. Idempotent: releasing a path that was never
    /// created (or is already gone) is a no-op, so cleanup after a partial
    /// failure is always safe to invoke unconditionally.
    pub fn release(mut self) {
        remove_checkout(&self.path);
        self.released = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.released {
            remove_checkout(&self.path);
        }
    }
}

/// Best-effort recursive removal. Failures are logged and never escalated;
/// by the time cleanup runs the primary outcome is already determined.
fn remove_checkout(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove workspace");
        }
    }
}

/// Creates uniquely named workspaces under a fixed root directory.
pub struct WorkspaceManager {
    root: PathBuf,
    fetcher: Box<dyn SourceFetcher>,
}

impl WorkspaceManager {
    /// Manager rooted at `root`, cloning with the system `git`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fetcher: Box::new(GitFetcher),
        }
    }

    /// Manager rooted at the configured `WORKSPACE_ROOT`.
    pub fn from_config() -> Self {
        Self::new(util::paths::workspace_root())
    }

    /// Replace the fetch strategy for this manager.
    pub fn with_fetcher<F: SourceFetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Resolve a unique destination and fetch `branch` of `repo_url` into it.
    ///
    /// On fetch failure the partially created directory is removed before the
    /// error propagates (the guard is armed before the fetch starts).
    pub async fn acquire(
        &self,
        repo_url: &str,
        submitter_label: &str,
        branch: &str,
    ) -> Result<Workspace, GraderError> {
        // request validation already checked this; repeated here so a caller
        // can never hand an arbitrary string to the clone command
        if !is_valid_repository_reference(repo_url) {
            return Err(GraderError::Acquisition(format!(
                "refusing to fetch unrecognized repository reference: {repo_url}"
            )));
        }

        util::paths::ensure_dir(&self.root).map_err(|e| {
            GraderError::Acquisition(format!(
                "failed to create workspace root {}: {e}",
                self.root.display()
            ))
        })?;

        let workspace = Workspace::new(self.root.join(unique_dir_name(submitter_label)));
        tracing::debug!(path = %workspace.path().display(), %branch, "acquiring workspace");
        self.fetcher.fetch(repo_url, branch, workspace.path()).await?;
        Ok(workspace)
    }
}

/// `{label}_{millis}_{token}`, with the label lowercased and reduced to
/// `[a-z0-9-]` so submitter identity can't smuggle path separators in.
fn unique_dir_name(submitter_label: &str) -> String {
    let label: String = submitter_label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let label = if label.is_empty() { "anonymous".to_string() } else { label };
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{label}_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        &token[..8]
    )
}
