//! Girder Runner
//!
//! Build-execution library for the Girder CI server:
//! - Workspace management: an isolated directory per build, removed on
//!   every exit path
//! - Source fetching: clone + checkout of the exact commit under test
//! - Build running: the external build tool's compile and test phases,
//!   with combined output capture and outcome classification
//!
//! The orchestrator wires these together into the pipeline; nothing in
//! this crate knows about reporting or HTTP.

pub mod build;
pub mod fetch;
pub mod workspace;

pub use build::{BuildExecutor, MavenConfig, MavenHome, MavenRunner};
pub use fetch::{GitFetcher, SourceFetcher};
pub use workspace::{Workspace, WorkspaceManager};
