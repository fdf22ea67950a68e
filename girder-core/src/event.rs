//! Push-event DTOs for the webhook boundary.
//!
//! These mirror the fields of a version-control push notification that
//! the pipeline actually consumes. Deserialization fails on any missing
//! required field, so a `BuildRequest` is only ever built from a
//! structurally complete event.

use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::types::BuildRequest;

/// Inbound push event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    pub repository: Repository,
    /// Absent for pushes that carry no commit (e.g. branch deletion);
    /// such events are rejected before the pipeline starts.
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub clone_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadCommit {
    pub id: String,
    pub timestamp: String,
    pub message: String,
    pub committer: Committer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Committer {
    pub email: String,
}

impl PushEvent {
    /// Converts the event into a build request, rejecting events
    /// without a head commit.
    pub fn into_build_request(self) -> Result<BuildRequest, EventError> {
        let head = self.head_commit.ok_or(EventError::MissingHeadCommit)?;
        Ok(BuildRequest {
            repo_name: self.repository.name,
            clone_url: self.repository.clone_url,
            commit_id: head.id,
            committer_email: head.committer.email,
            timestamp: head.timestamp,
            commit_message: head.message,
        })
    }
}
