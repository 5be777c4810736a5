//! Read-back of stored log entries

use axum::{
    Json,
    extract::{Path, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::SharedState;
use crate::log_entry::object_key;

/// GET /logs/{*repository} - the stored entry for a repository, e.g. `/logs/acme/app`
pub async fn get_log(
    AxumState(state): AxumState<SharedState>,
    Path(repository): Path<String>,
) -> Response {
    let key = object_key(&repository);
    match state
        .handler
        .store()
        .get_object(state.handler.bucket(), &key)
        .await
    {
        Ok(Some(body)) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("No log entry at '{}'", key)})),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to read '{}': {}", key, e);
            (e.status_code(), Json(json!({"error": e.to_string()}))).into_response()
        }
    }
}
