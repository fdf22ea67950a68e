//! Error types shared across the Girder crates.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while retrieving a commit into a workspace
///
/// Every variant maps to an `Errored` outcome: a fetch failure is an
/// infrastructure problem, never a code-quality one.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The commit does not exist in the cloned history
    #[error("commit not found: {0}")]
    NotFound(String),

    /// Access to the repository was denied
    #[error("repository access denied: {0}")]
    Unauthorized(String),

    /// Transport failure while cloning
    #[error("network error while fetching: {0}")]
    NetworkError(String),

    /// The version-control client reported an unclassified failure
    #[error("version-control client error: {0}")]
    Client(String),

    /// The version-control client could not be spawned
    #[error("failed to run version-control client: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the workspace manager
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Repository name contains path separators or traversal sequences
    #[error("invalid repository name: {0:?}")]
    InvalidName(String),

    /// The workspace directory could not be created
    #[error("failed to create workspace directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while turning a push event into a build request
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    /// The payload carries no `head_commit` object
    #[error("no head_commit in the request payload")]
    MissingHeadCommit,
}
