use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use tracing::info;

use super::ObjectStore;
use crate::error::{ChangeLogError, Result};

/// Object store kept in a local SQLite database, for deployments without S3.
#[derive(Debug, Clone)]
pub struct SqliteObjectStore {
    pool: SqlitePool,
}

impl SqliteObjectStore {
    /// Open (creating if needed) the database file and run migrations.
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        let db_path_str = db_path.to_string_lossy();

        if !db_path.exists() {
            info!("Database file not found at {}, creating...", db_path_str);
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ChangeLogError::Storage(format!("Failed to create database directory: {}", e))
                })?;
            }
            std::fs::File::create(db_path).map_err(|e| {
                ChangeLogError::Storage(format!("Failed to create database file: {}", e))
            })?;
        }

        let db_url = format!("sqlite:{}", db_path_str);
        info!("Connecting to database at {}", db_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| ChangeLogError::Storage(format!("Failed to connect to database: {}", e)))?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, running migrations first.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ChangeLogError::Storage(format!("Failed to run migrations: {}", e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl ObjectStore for SqliteObjectStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO objects (bucket, object_key, body, content_type, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (bucket, object_key) DO UPDATE SET
                body = excluded.body,
                content_type = excluded.content_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(bucket)
        .bind(key)
        .bind(body)
        .bind(content_type)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| ChangeLogError::Storage(format!("Failed to write object: {}", e)))?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> =
            sqlx::query_as("SELECT body FROM objects WHERE bucket = ? AND object_key = ?")
                .bind(bucket)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ChangeLogError::Storage(format!("Failed to read object: {}", e)))?;

        Ok(row.map(|(body,)| body))
    }
}
