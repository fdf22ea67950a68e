//! Outcome reporting
//!
//! Three independent side-effect channels, always attempted in a fixed
//! order: commit status, email notification, build-history append. They
//! share no invariant, so the policy is best-effort: each failure is
//! logged and never propagated to the other channels or to the run.

pub mod history;
pub mod notify;
pub mod status;

pub use history::HistoryStore;
pub use notify::{Notifier, SmtpNotifier};
pub use status::{CommitStatusReporter, StatusReporter};

use std::sync::Arc;
use tracing::{error, info};

use girder_core::{BuildHistoryEntry, BuildOutcome};

/// Fans one build outcome out to all reporting channels
pub struct Reporter {
    status: Arc<dyn StatusReporter>,
    notifier: Arc<dyn Notifier>,
    history: HistoryStore,
}

impl Reporter {
    pub fn new(
        status: Arc<dyn StatusReporter>,
        notifier: Arc<dyn Notifier>,
        history: HistoryStore,
    ) -> Self {
        Self {
            status,
            notifier,
            history,
        }
    }

    /// Reports an outcome through every channel.
    ///
    /// Channel failures are logged; a failing channel never prevents
    /// the remaining ones from running.
    pub async fn report(&self, outcome: &BuildOutcome) {
        let commit = &outcome.request.commit_id;

        match self.status.publish(outcome).await {
            Ok(state) => info!(%commit, %state, "commit status updated"),
            Err(e) => error!(%commit, "commit status update failed: {e:#}"),
        }

        if let Err(e) = self.notifier.notify(outcome).await {
            error!(%commit, "email notification failed: {e:#}");
        }

        match self.history.append(&BuildHistoryEntry::from(outcome)).await {
            Ok(()) => info!(%commit, "build recorded in history"),
            Err(e) => error!(%commit, "build-history write failed: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use girder_core::{BuildRequest, BuildStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn outcome() -> BuildOutcome {
        BuildOutcome::new(
            BuildRequest {
                repo_name: "demo".to_string(),
                clone_url: "https://example.com/demo.git".to_string(),
                commit_id: "abc123".to_string(),
                committer_email: "dev@example.com".to_string(),
                timestamp: "2024-02-01T12:00:00+01:00".to_string(),
                commit_message: "msg".to_string(),
            },
            BuildStatus::Succeeded,
            "BUILD OK\n".to_string(),
        )
    }

    struct FailingStatus;

    #[async_trait]
    impl StatusReporter for FailingStatus {
        async fn publish(&self, _: &BuildOutcome) -> anyhow::Result<String> {
            anyhow::bail!("simulated network error")
        }
    }

    struct RecordingNotifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, _: &BuildOutcome) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_status_failure_does_not_stop_other_channels() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("builds")).unwrap();
        std::fs::write(root.path().join("index.html"), "<body></body>").unwrap();
        std::fs::write(
            root.path().join("builds").join("_template.html"),
            "$commit_id $build_date $build_logs",
        )
        .unwrap();

        let notifier = Arc::new(RecordingNotifier {
            calls: AtomicUsize::new(0),
        });
        let reporter = Reporter::new(
            Arc::new(FailingStatus),
            notifier.clone(),
            HistoryStore::new(root.path().to_path_buf()),
        );

        reporter.report(&outcome()).await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
        assert!(root.path().join("builds").join("abc123.html").is_file());
    }
}
