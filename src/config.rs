//! Startup configuration: optional TOML file, overridden by environment variables.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ChangeLogError, Result};
use crate::github::FetcherConfig;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SQLITE_PATH: &str = "data/change_log.db";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const CONFIG_PATH_VAR: &str = "CHANGE_LOG_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    S3,
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ChangeLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StoreBackend::S3),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ChangeLogError::ConfigError(format!(
                "Unknown store backend '{}' (expected s3, sqlite or memory)",
                other
            ))),
        }
    }
}

/// Shape of the optional TOML file. Every key may be overridden from the environment.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct FileConfig {
    pub log_bucket: Option<String>,
    pub bind_address: Option<String>,
    pub store_backend: Option<String>,
    pub sqlite_path: Option<PathBuf>,
    pub s3_endpoint: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub http_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_bucket: String,
    pub bind_address: String,
    pub store_backend: StoreBackend,
    pub sqlite_path: PathBuf,
    pub s3_endpoint: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub fetcher: FetcherConfig,
}

impl AppConfig {
    /// Load from `$CHANGE_LOG_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => load_file(&path)?,
            Err(_) => FileConfig::default(),
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge file values with `env` lookups (env wins) and validate the result.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let log_bucket = env("LOG_BUCKET")
            .or(file.log_bucket)
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| {
                ChangeLogError::ConfigError(
                    "LOG_BUCKET is not set; it names the bucket log entries are written to"
                        .to_string(),
                )
            })?;

        let store_backend = match env("STORE_BACKEND").or(file.store_backend) {
            Some(name) => name.parse::<StoreBackend>()?,
            None => StoreBackend::S3,
        };

        let http_timeout_secs = match env("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ChangeLogError::ConfigError(format!("Invalid HTTP_TIMEOUT_SECS '{}': {}", raw, e))
            })?,
            None => file.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let mut fetcher = FetcherConfig {
            timeout: Duration::from_secs(http_timeout_secs),
            ..FetcherConfig::default()
        };
        if let Some(user_agent) = env("HTTP_USER_AGENT").or(file.user_agent) {
            fetcher.user_agent = user_agent;
        }

        Ok(Self {
            log_bucket,
            bind_address: env("BIND_ADDRESS")
                .or(file.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            store_backend,
            sqlite_path: env("SQLITE_PATH")
                .map(PathBuf::from)
                .or(file.sqlite_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH)),
            s3_endpoint: env("S3_ENDPOINT").or(file.s3_endpoint),
            log_dir: env("LOG_DIR").map(PathBuf::from).or(file.log_dir),
            fetcher,
        })
    }
}

/// Load and parse the configuration file
fn load_file(path: &str) -> Result<FileConfig> {
    let config_str = fs::read_to_string(path).map_err(|e| {
        ChangeLogError::ConfigError(format!("Failed to read config file '{}': {}", path, e))
    })?;

    toml::from_str(&config_str).map_err(|e| {
        ChangeLogError::ConfigError(format!("Failed to parse config file '{}': {}", path, e))
    })
}
