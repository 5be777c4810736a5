//! HTTP handlers hosting the webhook pipeline

pub mod logs;
pub mod stats;
pub mod webhook;

pub use logs::get_log;
pub use stats::{root, status};
pub use webhook::{handle_webhook, invoke};
