//! Liveness and status endpoints

use axum::{Json, extract::State as AxumState};
use serde::Serialize;

use crate::SharedState;

pub async fn root() -> &'static str {
    "simple_change_log is running"
}

/// Server information
#[derive(Debug, Serialize)]
pub struct ServerStats {
    pub name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: String,
}

#[derive(Debug, Serialize)]
pub struct StoreStats {
    pub backend: String,
    pub bucket: String,
}

#[derive(Debug, Serialize)]
pub struct InvocationCounts {
    pub succeeded: u64,
    pub failed: u64,
}

/// Combined status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server: ServerStats,
    pub store: StoreStats,
    pub invocations: InvocationCounts,
}

/// GET /status - server, store and invocation counters
pub async fn status(AxumState(state): AxumState<SharedState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        server: ServerStats {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            started_at: state.started_at.to_rfc3339(),
        },
        store: StoreStats {
            backend: state.handler.store().name().to_string(),
            bucket: state.handler.bucket().to_string(),
        },
        invocations: InvocationCounts {
            succeeded: state.stats.succeeded(),
            failed: state.stats.failed(),
        },
    })
}
