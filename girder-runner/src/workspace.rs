//! Workspace management
//!
//! Each pipeline run owns exactly one workspace: a directory created
//! empty, populated by the fetcher, consumed by the build runner and
//! removed unconditionally when the run ends. Directory names carry a
//! random suffix so they stay collision-free even if concurrent runs
//! are introduced later.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use girder_core::WorkspaceError;

/// Handle to one build's working directory
///
/// Exclusively owned by the orchestrator for the duration of a run.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Allocates and releases per-build workspaces under a fixed root
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a unique, empty directory for one build.
    ///
    /// The name derives from the repository name; names containing
    /// path separators or `..` are rejected before touching the
    /// filesystem.
    pub async fn acquire(&self, repo_name: &str) -> Result<Workspace, WorkspaceError> {
        let name = sanitize(repo_name)?;
        let suffix = Uuid::new_v4().simple().to_string();
        let path = self.root.join(format!("{}-{}", name, &suffix[..8]));

        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| WorkspaceError::Create {
                path: path.clone(),
                source,
            })?;

        debug!(workspace = %path.display(), "workspace acquired");
        Ok(Workspace { path })
    }

    /// Removes a workspace recursively.
    ///
    /// A missing directory is a no-op; removal errors are logged and
    /// swallowed so cleanup never masks the run's real outcome.
    pub async fn release(&self, workspace: Workspace) {
        match tokio::fs::remove_dir_all(&workspace.path).await {
            Ok(()) => debug!(workspace = %workspace.path.display(), "workspace released"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                workspace = %workspace.path.display(),
                "failed to remove workspace: {}", e
            ),
        }
    }
}

fn sanitize(repo_name: &str) -> Result<String, WorkspaceError> {
    if repo_name.is_empty()
        || repo_name.contains(['/', '\\'])
        || repo_name.contains("..")
        || repo_name.starts_with('.')
    {
        return Err(WorkspaceError::InvalidName(repo_name.to_string()));
    }

    Ok(repo_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect())
}
