//! Outbound GitHub REST calls used by pull-request events.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::{ChangeLogError, Result};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Entry of the `commits_url` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Some listings already embed the changed files.
    #[serde(default)]
    pub files: Option<Vec<CommitFile>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitFile {
    pub filename: String,
}

/// Single commit as returned by the commit's own `url`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub files: Vec<CommitFile>,
}

#[async_trait]
pub trait CommitFetcher: Send + Sync {
    async fn fetch_commit_list(&self, url: &str) -> Result<Vec<CommitSummary>>;

    async fn fetch_commit(&self, url: &str) -> Result<CommitDetail>;
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("simple_change_log/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `reqwest` backed fetcher. One pooled client for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct HttpCommitFetcher {
    client: reqwest::Client,
}

impl HttpCommitFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ChangeLogError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ChangeLogError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChangeLogError::fetch(url, format!("status {}", status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ChangeLogError::fetch(url, format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl CommitFetcher for HttpCommitFetcher {
    async fn fetch_commit_list(&self, url: &str) -> Result<Vec<CommitSummary>> {
        self.get_json(url).await
    }

    async fn fetch_commit(&self, url: &str) -> Result<CommitDetail> {
        self.get_json(url).await
    }
}
