//! HTTP API layer
//!
//! One webhook endpoint plus a health probe. The webhook always
//! acknowledges with HTTP 200: the real outcome of a build is only
//! observable through the reporting channels, never through the
//! triggering response. Malformed payloads are warn-logged and dropped
//! without starting a pipeline run.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::pipeline::Pipeline;
use girder_core::event::PushEvent;

/// Create the main API router
pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook", post(handle_webhook))
        .with_state(pipeline)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// Form wrapper used by webhook senders that post
/// `application/x-www-form-urlencoded` bodies with a `payload` field.
#[derive(Debug, Deserialize)]
struct WebhookForm {
    payload: String,
}

/// Webhook entry point: parse, validate, run the pipeline.
async fn handle_webhook(
    State(pipeline): State<Arc<Pipeline>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, &'static str) {
    let event = match parse_payload(&headers, &body) {
        Ok(event) => event,
        Err(e) => {
            warn!("rejected webhook payload: {e:#}");
            return (StatusCode::OK, "");
        }
    };

    let request = match event.into_build_request() {
        Ok(request) => request,
        Err(e) => {
            warn!("rejected push event: {e}");
            return (StatusCode::OK, "");
        }
    };

    pipeline.run(request).await;
    (StatusCode::OK, "CI job done\n")
}

/// Decodes the push event from either transport: a form-encoded
/// `payload` field or a raw JSON body.
fn parse_payload(headers: &HeaderMap, body: &str) -> anyhow::Result<PushEvent> {
    use anyhow::Context;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let form: WebhookForm =
            serde_urlencoded::from_str(body).context("malformed form body")?;
        serde_json::from_str(&form.payload).context("malformed push event in payload field")
    } else {
        serde_json::from_str(body).context("malformed push event body")
    }
}
