//! Girder Orchestrator
//!
//! The CI server binary: listens for push webhooks, runs one sequential
//! build pipeline per accepted event, and reports each outcome through
//! the commit-status API, email, and the on-disk build history.
//!
//! Architecture:
//! - Configuration: status token from the single positional argument,
//!   everything else from environment variables with defaults
//! - API: axum router exposing the webhook and a health probe
//! - Pipeline: the state machine from workspace acquisition to cleanup
//! - Reporting: three best-effort channels, isolated from one another

mod api;
mod config;
mod pipeline;
mod report;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::report::{CommitStatusReporter, HistoryStore, Reporter, SmtpNotifier};
use girder_client::StatusClient;
use girder_runner::{GitFetcher, MavenConfig, MavenRunner, WorkspaceManager};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "girder_orchestrator=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The status-API token is the one positional argument; without it
    // the server is useless, so bail before binding anything.
    let token = std::env::args()
        .nth(1)
        .context("missing status-API token (usage: girder-orchestrator <token>)")?;

    let config = Config::from_env(token);
    config.validate()?;

    info!("Starting Girder Orchestrator");
    info!(
        "Loaded configuration: bind_addr={}, status_api_base={}, history_root={}",
        config.bind_addr,
        config.status_api_base,
        config.history_root.display()
    );

    let status_client = StatusClient::new(config.status_api_base.clone(), config.token.clone());
    let reporter = Reporter::new(
        Arc::new(CommitStatusReporter::new(
            status_client,
            config.status_repo_owner.clone(),
        )),
        Arc::new(SmtpNotifier::new(&config.smtp).context("failed to build SMTP transport")?),
        HistoryStore::new(config.history_root.clone()),
    );

    let pipeline = Arc::new(Pipeline::new(
        WorkspaceManager::new(config.workspace_root.clone()),
        Arc::new(GitFetcher::new()),
        Arc::new(MavenRunner::new(MavenConfig::from_env())),
        reporter,
    ));

    let app = api::create_router(pipeline);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
