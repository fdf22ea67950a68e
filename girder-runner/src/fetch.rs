//! Source fetching
//!
//! Thin wrapper over the external version-control client: a full clone
//! of the repository into the workspace followed by a checkout of the
//! exact commit under test. The stderr of the client is classified into
//! the `FetchError` taxonomy so the orchestrator can report an
//! `Errored` outcome distinct from a code-quality failure.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use girder_core::FetchError;

/// Service trait for retrieving a commit into a workspace
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Populates `workspace` with the source tree of `commit_id`.
    async fn fetch(
        &self,
        clone_url: &str,
        commit_id: &str,
        workspace: &Path,
    ) -> Result<(), FetchError>;
}

/// Fetcher backed by the `git` command-line client
pub struct GitFetcher {
    git_bin: String,
}

impl GitFetcher {
    pub fn new() -> Self {
        Self {
            git_bin: "git".to_string(),
        }
    }
}

impl Default for GitFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceFetcher for GitFetcher {
    async fn fetch(
        &self,
        clone_url: &str,
        commit_id: &str,
        workspace: &Path,
    ) -> Result<(), FetchError> {
        debug!(url = %clone_url, commit = %commit_id, "cloning repository");

        let clone = Command::new(&self.git_bin)
            .arg("clone")
            .arg(clone_url)
            .arg(workspace)
            .output()
            .await?;
        if !clone.status.success() {
            let stderr = String::from_utf8_lossy(&clone.stderr);
            return Err(classify_clone_failure(&stderr));
        }

        let checkout = Command::new(&self.git_bin)
            .arg("-C")
            .arg(workspace)
            .arg("checkout")
            .arg("--detach")
            .arg(commit_id)
            .output()
            .await?;
        if !checkout.status.success() {
            let stderr = String::from_utf8_lossy(&checkout.stderr);
            return Err(classify_checkout_failure(&stderr));
        }

        debug!(commit = %commit_id, "checkout complete");
        Ok(())
    }
}

fn classify_clone_failure(stderr: &str) -> FetchError {
    let message = stderr.trim().to_string();
    if stderr.contains("Authentication failed")
        || stderr.contains("could not read Username")
        || stderr.contains("Permission denied")
        || stderr.contains("access denied")
    {
        FetchError::Unauthorized(message)
    } else if stderr.contains("Could not resolve host")
        || stderr.contains("unable to access")
        || stderr.contains("Connection refused")
        || stderr.contains("timed out")
    {
        FetchError::NetworkError(message)
    } else {
        FetchError::Client(message)
    }
}

fn classify_checkout_failure(stderr: &str) -> FetchError {
    let message = stderr.trim().to_string();
    if stderr.contains("did not match any")
        || stderr.contains("unknown revision")
        || stderr.contains("reference is not a tree")
        || stderr.contains("is not a commit")
    {
        FetchError::NotFound(message)
    } else {
        FetchError::Client(message)
    }
}
