//! Email channel
//!
//! One plain-text message per run, addressed to the committer taken
//! from the push event. The subject is fixed; the body varies with the
//! outcome status.

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use girder_core::{BuildOutcome, BuildStatus};

const SUBJECT: &str = "Current state update";

/// Service trait for notifying the committer of an outcome
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, outcome: &BuildOutcome) -> anyhow::Result<()>;
}

/// Notifier backed by authenticated SMTP submission over STARTTLS
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("invalid SMTP relay host {:?}", config.host))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = config
            .from
            .parse()
            .with_context(|| format!("invalid sender mailbox {:?}", config.from))?;

        Ok(Self { transport, from })
    }
}

fn message_body(outcome: &BuildOutcome) -> String {
    let verdict = match outcome.status {
        BuildStatus::Succeeded => "The latest commit resulted in: SUCCESS",
        BuildStatus::Failed => "The latest commit resulted in: FAILURE",
        BuildStatus::Errored => "Error, issue unknown",
    };
    format!(
        "{verdict}\nCommit Id: {}\nCommit message: {}\n",
        outcome.request.commit_id, outcome.request.commit_message
    )
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, outcome: &BuildOutcome) -> anyhow::Result<()> {
        let to: Mailbox = outcome
            .request
            .committer_email
            .parse()
            .with_context(|| {
                format!(
                    "invalid committer email {:?}",
                    outcome.request.committer_email
                )
            })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(SUBJECT)
            .body(message_body(outcome))
            .context("failed to compose notification email")?;

        self.transport
            .send(email)
            .await
            .context("SMTP submission failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girder_core::BuildRequest;

    fn outcome(status: BuildStatus) -> BuildOutcome {
        BuildOutcome::new(
            BuildRequest {
                repo_name: "demo".to_string(),
                clone_url: "https://example.com/demo.git".to_string(),
                commit_id: "abc123".to_string(),
                committer_email: "dev@example.com".to_string(),
                timestamp: "2024-02-01T12:00:00+01:00".to_string(),
                commit_message: "add feature".to_string(),
            },
            status,
            String::new(),
        )
    }

    #[test]
    fn test_success_body() {
        let body = message_body(&outcome(BuildStatus::Succeeded));
        assert!(body.contains("SUCCESS"));
        assert!(body.contains("Commit Id: abc123"));
        assert!(body.contains("Commit message: add feature"));
    }

    #[test]
    fn test_failure_body() {
        let body = message_body(&outcome(BuildStatus::Failed));
        assert!(body.contains("FAILURE"));
    }

    #[test]
    fn test_errored_body_is_distinct() {
        let body = message_body(&outcome(BuildStatus::Errored));
        assert!(body.contains("issue unknown"));
        assert!(!body.contains("SUCCESS"));
    }
}
