//! Pipeline orchestration
//!
//! The single component aware of the full build sequence:
//! workspace acquisition → fetch → compile → test → reporting →
//! cleanup. Fetch and workspace failures short-circuit straight to
//! reporting with an `Errored` outcome; the workspace is released on
//! every path that allocated one. A run lock keeps exactly one build in
//! flight at a time.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::report::Reporter;
use girder_core::{BuildOutcome, BuildRequest};
use girder_runner::{BuildExecutor, SourceFetcher, WorkspaceManager};

/// The build pipeline state machine
pub struct Pipeline {
    workspaces: WorkspaceManager,
    fetcher: Arc<dyn SourceFetcher>,
    builder: Arc<dyn BuildExecutor>,
    reporter: Reporter,
    /// Serializes runs: the system handles one build end to end.
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        workspaces: WorkspaceManager,
        fetcher: Arc<dyn SourceFetcher>,
        builder: Arc<dyn BuildExecutor>,
        reporter: Reporter,
    ) -> Self {
        Self {
            workspaces,
            fetcher,
            builder,
            reporter,
            run_lock: Mutex::new(()),
        }
    }

    /// Executes one full pipeline run for a validated build request.
    ///
    /// Always produces exactly one outcome and always runs the full
    /// reporter, whatever the build result. Returns the outcome so
    /// callers (and tests) can observe it.
    pub async fn run(&self, request: BuildRequest) -> BuildOutcome {
        let _guard = self.run_lock.lock().await;
        info!(
            repo = %request.repo_name,
            commit = %request.commit_id,
            "pipeline run started"
        );

        let workspace = match self.workspaces.acquire(&request.repo_name).await {
            Ok(workspace) => workspace,
            Err(e) => {
                error!("workspace acquisition failed: {e}");
                let outcome =
                    BuildOutcome::errored(request, format!("workspace acquisition failed: {e}\n"));
                self.reporter.report(&outcome).await;
                return outcome;
            }
        };

        let outcome = match self
            .fetcher
            .fetch(&request.clone_url, &request.commit_id, workspace.path())
            .await
        {
            Ok(()) => self.builder.run(&request, workspace.path()).await,
            Err(e) => {
                warn!(commit = %request.commit_id, "fetch failed: {e}");
                BuildOutcome::errored(request, format!("fetch failed: {e}\n"))
            }
        };

        self.reporter.report(&outcome).await;
        self.workspaces.release(workspace).await;

        info!(
            commit = %outcome.request.commit_id,
            status = ?outcome.status,
            "pipeline run finished"
        );
        outcome
    }
}
