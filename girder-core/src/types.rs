//! Domain types shared between the runner and the orchestrator.

use serde::{Deserialize, Serialize};

/// Result status of one pipeline run
///
/// `Failed` is a code-quality failure (compile or test), `Errored` an
/// infrastructure or tooling failure unrelated to the code under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    Succeeded,
    Failed,
    Errored,
}

impl BuildStatus {
    /// Whether the commit under test passed compile and tests.
    pub fn passed(&self) -> bool {
        matches!(self, BuildStatus::Succeeded)
    }
}

/// A validated build request extracted from an inbound push event
///
/// Either fully populated or never constructed; partially filled
/// requests do not flow into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub repo_name: String,
    pub clone_url: String,
    pub commit_id: String,
    pub committer_email: String,
    pub timestamp: String,
    pub commit_message: String,
}

/// Result of one pipeline run
///
/// Constructed once per run by the build runner, or by the orchestrator
/// on an early short-circuit, and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub status: BuildStatus,
    /// Combined compile/test output captured during the run. Populated
    /// even for `Errored` outcomes raised before any tool was invoked.
    pub log: String,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub request: BuildRequest,
}

impl BuildOutcome {
    /// Creates an outcome completed at the current instant.
    pub fn new(request: BuildRequest, status: BuildStatus, log: String) -> Self {
        Self {
            status,
            log,
            completed_at: chrono::Utc::now(),
            request,
        }
    }

    /// Creates an `Errored` outcome whose log carries the diagnostic.
    pub fn errored(request: BuildRequest, diagnostic: impl Into<String>) -> Self {
        Self::new(request, BuildStatus::Errored, diagnostic.into())
    }

    /// Human-readable build date for reporting.
    pub fn build_date(&self) -> String {
        self.completed_at.to_rfc2822()
    }
}

/// Persisted build-history record, one per pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildHistoryEntry {
    pub commit_id: String,
    pub build_date: String,
    pub log: String,
}

impl From<&BuildOutcome> for BuildHistoryEntry {
    fn from(outcome: &BuildOutcome) -> Self {
        Self {
            commit_id: outcome.request.commit_id.clone(),
            build_date: outcome.build_date(),
            log: outcome.log.clone(),
        }
    }
}
