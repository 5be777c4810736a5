//! Object store backends the log entries are written to.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::error::Result;

pub mod memory;
pub mod s3;
pub mod sqlite;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;
pub use sqlite::SqliteObjectStore;

/// Minimal key-value blob store. Writes overwrite whatever is at the key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name, reported by `/status`.
    fn name(&self) -> &'static str;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Build the configured backend once, at startup.
pub async fn build_store(config: &AppConfig) -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.store_backend {
        StoreBackend::S3 => Arc::new(S3ObjectStore::from_env(config.s3_endpoint.as_deref()).await),
        StoreBackend::Sqlite => Arc::new(SqliteObjectStore::open(&config.sqlite_path).await?),
        StoreBackend::Memory => Arc::new(MemoryObjectStore::new()),
    };
    info!("Using '{}' object store backend", store.name());
    Ok(store)
}
