//! Core types for Girder
//!
//! This crate contains:
//! - Shared domain types (BuildRequest, BuildOutcome, etc.)
//! - Push-event DTOs for the webhook boundary
//! - Error types shared between the runner and the orchestrator
//!
//! Note: Execution logic lives in girder-runner, reporting and HTTP
//! handling in girder-orchestrator.

pub mod error;
pub mod event;
pub mod types;

pub use error::{EventError, FetchError, WorkspaceError};
pub use types::{BuildHistoryEntry, BuildOutcome, BuildRequest, BuildStatus};
