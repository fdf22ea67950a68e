//! Orchestrator configuration
//!
//! All configuration is explicit and passed into the components at
//! construction; there is no process-wide mutable state. The status
//! token comes from the command line, the rest from environment
//! variables with defaults. MAVEN_HOME is deliberately not checked
//! here: the build runner resolves it lazily so its absence only
//! surfaces once a build reaches the test phase.

use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the webhook listener binds to
    pub bind_addr: String,

    /// Base URL of the commit-status API
    pub status_api_base: String,

    /// Owner/organization segment of the status endpoint path
    pub status_repo_owner: String,

    /// Status-API authorization token (positional argument)
    pub token: String,

    /// Outbound email settings
    pub smtp: SmtpConfig,

    /// Root of the build-history pages
    pub history_root: PathBuf,

    /// Directory under which per-build workspaces are created
    pub workspace_root: PathBuf,
}

/// SMTP submission settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. "Girder CI <ci@example.com>"
    pub from: String,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - GIRDER_BIND_ADDR (default: 0.0.0.0:8026)
    /// - STATUS_API_BASE (default: https://api.github.com)
    /// - STATUS_REPO_OWNER (default: girder-ci)
    /// - SMTP_HOST (default: smtp.gmail.com)
    /// - SMTP_USERNAME / SMTP_PASSWORD (default: empty)
    /// - SMTP_FROM (default: SMTP_USERNAME)
    /// - HISTORY_ROOT (default: build_history)
    /// - WORKSPACE_ROOT (default: .)
    pub fn from_env(token: String) -> Self {
        let username = env_or("SMTP_USERNAME", "");
        let from = std::env::var("SMTP_FROM").unwrap_or_else(|_| {
            if username.is_empty() {
                "girder-ci@localhost".to_string()
            } else {
                username.clone()
            }
        });

        Self {
            bind_addr: env_or("GIRDER_BIND_ADDR", "0.0.0.0:8026"),
            status_api_base: env_or("STATUS_API_BASE", "https://api.github.com"),
            status_repo_owner: env_or("STATUS_REPO_OWNER", "girder-ci"),
            token,
            smtp: SmtpConfig {
                host: env_or("SMTP_HOST", "smtp.gmail.com"),
                username,
                password: env_or("SMTP_PASSWORD", ""),
                from,
            },
            history_root: PathBuf::from(env_or("HISTORY_ROOT", "build_history")),
            workspace_root: PathBuf::from(env_or("WORKSPACE_ROOT", ".")),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token.is_empty() {
            anyhow::bail!("status-API token cannot be empty");
        }

        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if !self.status_api_base.starts_with("http://")
            && !self.status_api_base.starts_with("https://")
        {
            anyhow::bail!("status_api_base must start with http:// or https://");
        }

        if self.smtp.host.is_empty() {
            anyhow::bail!("smtp host cannot be empty");
        }

        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
