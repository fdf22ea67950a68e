//! Girder Status Client
//!
//! A small, type-safe HTTP client for the commit-status API of the
//! hosting platform. The orchestrator uses it to flag each built commit
//! as `success` or `failure` next to the commit itself.
//!
//! # Example
//!
//! ```no_run
//! use girder_client::{CommitState, StatusClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), girder_client::ClientError> {
//!     let client = StatusClient::new("https://api.github.com", "<token>");
//!     let state = client
//!         .update_commit_status("acme", "demo", "d6fde92", CommitState::Success, "CI server status")
//!         .await?;
//!     println!("commit flagged as {state}");
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ClientError, Result};

use reqwest::Client;
use serde_json::json;
use tracing::debug;

/// Two-valued commit state understood by the status API
///
/// The pipeline's tri-state outcome collapses onto this: `Errored` runs
/// are reported as `failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Success,
    Failure,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Success => "success",
            CommitState::Failure => "failure",
        }
    }
}

/// HTTP client for the commit-status API
#[derive(Debug, Clone)]
pub struct StatusClient {
    /// Base URL of the API (e.g., "https://api.github.com")
    base_url: String,
    /// Authorization token, supplied at process startup
    token: String,
    /// HTTP client instance
    client: Client,
}

impl StatusClient {
    /// Create a new status client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the status API
    /// * `token` - Bearer token for the Authorization header
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client: Client::new(),
        }
    }

    /// Create a new status client with a custom HTTP client
    ///
    /// Allows configuring timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the status API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a commit status
    ///
    /// POSTs `{"state", "description"}` to
    /// `/repos/{owner}/{repo}/statuses/{sha}` and returns the `state`
    /// field of the API's response.
    pub async fn update_commit_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        state: CommitState,
        description: &str,
    ) -> Result<String> {
        let url = format!("{}/repos/{}/{}/statuses/{}", self.base_url, owner, repo, sha);
        debug!(%url, state = state.as_str(), "updating commit status");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .json(&json!({
                "state": state.as_str(),
                "description": description,
            }))
            .send()
            .await?;

        let body: serde_json::Value = self.handle_response(response).await?;
        body.get("state")
            .and_then(|s| s.as_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                ClientError::ParseError("missing `state` field in status response".to_string())
            })
    }

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the response body if successful.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = StatusClient::new("https://api.github.com/", "tok");
        assert_eq!(client.base_url(), "https://api.github.com");
    }

    #[test]
    fn test_commit_state_strings() {
        assert_eq!(CommitState::Success.as_str(), "success");
        assert_eq!(CommitState::Failure.as_str(), "failure");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = StatusClient::with_client("https://api.github.com", "tok", http_client);
        assert_eq!(client.base_url(), "https://api.github.com");
    }
}
