//! Webhook entry points: gateway-wrapped events and direct GitHub deliveries

use axum::{
    Json,
    body::Bytes,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::info;

use crate::SharedState;
use crate::error::{ChangeLogError, Result};
use crate::event::WebhookEvent;
use crate::log_entry::InvocationResponse;

/// POST /invoke - body is `{"body": <JSON string or object>}`
pub async fn invoke(AxumState(state): AxumState<SharedState>, body: Bytes) -> Response {
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            info!("Could not parse invocation event: {:?}", e);
            return respond(
                &state,
                Err(ChangeLogError::MalformedPayload(format!(
                    "invalid invocation event: {}",
                    e
                ))),
            );
        }
    };

    let result = state.handler.handle_event(event).await;
    respond(&state, result)
}

/// POST /webhook - body is the GitHub payload itself.
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Only handle "push" and "pull_request" events. Without the header the payload shape decides.
    let event_opt = headers.get("X-GitHub-Event").and_then(|v| v.to_str().ok());
    if let Some(event) = event_opt {
        if event != "push" && event != "pull_request" {
            info!("Ignoring {:?} event", event);
            return StatusCode::NO_CONTENT.into_response();
        }
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            info!("Could not parse JSON body: {:?}", e);
            return respond(
                &state,
                Err(ChangeLogError::MalformedPayload(format!(
                    "body is not valid JSON: {}",
                    e
                ))),
            );
        }
    };

    let result = state.handler.handle_payload(&payload).await;
    respond(&state, result)
}

fn respond(state: &SharedState, result: Result<InvocationResponse>) -> Response {
    match result {
        Ok(response) => {
            state.stats.record_success();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            state.stats.record_failure();
            (e.status_code(), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
