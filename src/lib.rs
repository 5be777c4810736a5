pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod github;
pub mod handler;
pub mod log_entry;
pub mod logging;
pub mod store;

use axum::{Router, routing};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use handler::WebhookHandler;

/// Success/failure counts since startup.
#[derive(Debug, Default)]
pub struct InvocationStats {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl InvocationStats {
    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

pub struct AppState {
    pub handler: WebhookHandler,
    pub stats: InvocationStats,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(handler: WebhookHandler) -> Self {
        Self {
            handler,
            stats: InvocationStats::default(),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", routing::get(api::root))
        .route("/invoke", routing::post(api::invoke))
        .route("/webhook", routing::post(api::handle_webhook))
        .route("/status", routing::get(api::status))
        .route("/logs/{*repository}", routing::get(api::get_log))
        .with_state(state)
}
