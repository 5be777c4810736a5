//! The invocation pipeline: decode, collect changed files, write one log entry.

use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use crate::error::{ChangeLogError, Result};
use crate::event::{Payload, PushCommit, WebhookEvent};
use crate::github::CommitFetcher;
use crate::log_entry::{ChangedFiles, InvocationResponse, LogEntry};
use crate::store::ObjectStore;

const LOG_CONTENT_TYPE: &str = "application/json";

/// Processes webhook events. Built once at startup around the shared clients.
#[derive(Clone)]
pub struct WebhookHandler {
    store: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn CommitFetcher>,
    bucket: String,
}

impl WebhookHandler {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn CommitFetcher>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            store,
            fetcher,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Handle a gateway-wrapped event whose body may still be JSON-encoded.
    pub async fn handle_event(&self, event: WebhookEvent) -> Result<InvocationResponse> {
        self.invocation(async move {
            let payload = event.body.decode()?;
            self.process(&payload).await
        })
        .await
    }

    /// Handle an already decoded payload. Nothing is written unless every step succeeds.
    pub async fn handle_payload(&self, payload: &Value) -> Result<InvocationResponse> {
        self.invocation(self.process(payload)).await
    }

    /// Run one invocation inside its own span, logging the failure there.
    async fn invocation<F>(&self, work: F) -> Result<InvocationResponse>
    where
        F: Future<Output = Result<InvocationResponse>>,
    {
        let span = info_span!("invocation", id = %Uuid::now_v7());
        async move {
            let result = work.await;
            if let Err(e) = &result {
                error!("Invocation failed: {}", e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn process(&self, payload: &Value) -> Result<InvocationResponse> {
        let payload = Payload::from_value(payload)?;
        debug!(
            "Processing {} event for '{}'",
            payload.kind(),
            payload.repository()
        );

        let entry = self.build_log_entry(payload).await?;
        self.write_log_entry(&entry).await?;
        Ok(InvocationResponse::log_entry_created())
    }

    pub async fn build_log_entry(&self, payload: Payload) -> Result<LogEntry> {
        let (repository, files) = match payload {
            Payload::Push {
                repository,
                commits,
            } => (repository, collect_push_files(&commits)),
            Payload::PullRequest {
                repository,
                commits_url,
            } => {
                let files =
                    collect_pull_request_files(self.fetcher.as_ref(), &commits_url).await?;
                (repository, files)
            }
        };

        if files.is_empty() {
            debug!("No changed files found for '{}'", repository);
        }
        Ok(LogEntry::new(repository, files))
    }

    async fn write_log_entry(&self, entry: &LogEntry) -> Result<()> {
        let body = serde_json::to_string(entry)?;
        info!("{}", body);

        let key = entry.object_key();
        self.store
            .put_object(&self.bucket, &key, body.into_bytes(), LOG_CONTENT_TYPE)
            .await?;
        info!(
            "Wrote {} changed file(s) to {}/{} via {}",
            entry.files_changed.len(),
            self.bucket,
            key,
            self.store.name()
        );
        Ok(())
    }
}

/// Flatten every commit's `modified` list, in commit order.
pub fn collect_push_files(commits: &[PushCommit]) -> ChangedFiles {
    let mut files = ChangedFiles::new();
    for commit in commits {
        files.extend(commit.modified.iter().cloned());
    }
    files
}

/// One GET for the commit list, then one GET per commit whose files are not embedded.
pub async fn collect_pull_request_files(
    fetcher: &dyn CommitFetcher,
    commits_url: &str,
) -> Result<ChangedFiles> {
    let commits = fetcher.fetch_commit_list(commits_url).await?;
    debug!("{} commit(s) listed at {}", commits.len(), commits_url);

    let mut files = ChangedFiles::new();
    for (idx, commit) in commits.into_iter().enumerate() {
        let commit_files = match (commit.files, commit.url) {
            (Some(embedded), _) => embedded,
            (None, Some(url)) => fetcher.fetch_commit(&url).await?.files,
            (None, None) => {
                return Err(ChangeLogError::MalformedPayload(format!(
                    "commit {} listed at {} has neither 'files' nor 'url'",
                    commit.sha.as_deref().unwrap_or(&idx.to_string()),
                    commits_url
                )));
            }
        };
        files.extend(commit_files.into_iter().map(|f| f.filename));
    }
    Ok(files)
}
