//! Commit-status channel
//!
//! Collapses the tri-state outcome onto the status API's two-valued
//! state: an `Errored` run is reported as `failure`, so a commit never
//! shows green because the infrastructure broke.

use async_trait::async_trait;
use girder_client::{CommitState, StatusClient};
use girder_core::{BuildOutcome, BuildStatus};

/// Description string attached to every submitted status.
const STATUS_DESCRIPTION: &str = "CI server status";

/// Service trait for publishing a commit status
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// Publishes the outcome and returns the state echoed by the API.
    async fn publish(&self, outcome: &BuildOutcome) -> anyhow::Result<String>;
}

/// Status reporter backed by the hosting platform's status API
pub struct CommitStatusReporter {
    client: StatusClient,
    owner: String,
}

impl CommitStatusReporter {
    pub fn new(client: StatusClient, owner: String) -> Self {
        Self { client, owner }
    }
}

fn commit_state(status: BuildStatus) -> CommitState {
    match status {
        BuildStatus::Succeeded => CommitState::Success,
        BuildStatus::Failed | BuildStatus::Errored => CommitState::Failure,
    }
}

#[async_trait]
impl StatusReporter for CommitStatusReporter {
    async fn publish(&self, outcome: &BuildOutcome) -> anyhow::Result<String> {
        let state = self
            .client
            .update_commit_status(
                &self.owner,
                &outcome.request.repo_name,
                &outcome.request.commit_id,
                commit_state(outcome.status),
                STATUS_DESCRIPTION,
            )
            .await?;
        Ok(state)
    }
}
