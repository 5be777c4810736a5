use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Message returned (JSON-encoded) in the body of every successful invocation.
pub const CONFIRMATION_MESSAGE: &str = "Log entry created";

/// Record written to the object store, one per invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub repository: String,
    pub files_changed: Vec<String>,
}

impl LogEntry {
    pub fn new(repository: String, files_changed: ChangedFiles) -> Self {
        Self {
            repository,
            files_changed: files_changed.into_vec(),
        }
    }

    /// Object key for this entry. The repository name is used verbatim.
    pub fn object_key(&self) -> String {
        object_key(&self.repository)
    }
}

pub fn object_key(repository: &str) -> String {
    format!("{}_log.json", repository)
}

/// Deduplicating accumulator that keeps first-seen order.
#[derive(Debug, Default, Clone)]
pub struct ChangedFiles {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl ChangedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>) {
        let path = path.into();
        if self.seen.insert(path.clone()) {
            self.ordered.push(path);
        }
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

impl<S: Into<String>> Extend<S> for ChangedFiles {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for path in iter {
            self.push(path);
        }
    }
}

/// Fixed-shape response of a successful invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn log_entry_created() -> Self {
        Self {
            status_code: 200,
            // JSON-encoding a plain string cannot fail
            body: serde_json::Value::from(CONFIRMATION_MESSAGE).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_repository_verbatim() {
        assert_eq!(object_key("acme/app"), "acme/app_log.json");
        assert_eq!(object_key("app"), "app_log.json");
    }

    #[test]
    fn changed_files_dedups_and_keeps_first_seen_order() {
        let mut files = ChangedFiles::new();
        files.extend(["b.py", "a.py", "b.py"]);
        files.push("c.py");
        files.push("a.py");
        assert_eq!(files.len(), 3);
        assert_eq!(files.into_vec(), vec!["b.py", "a.py", "c.py"]);
    }

    #[test]
    fn empty_until_first_path() {
        let mut files = ChangedFiles::new();
        assert!(files.is_empty());
        files.push("a.py");
        assert!(!files.is_empty());
    }

    #[test]
    fn entry_serializes_to_expected_shape() {
        let mut files = ChangedFiles::new();
        files.extend(["a.py", "b.py", "b.py"]);
        let entry = LogEntry::new("acme/app".into(), files);
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"repository":"acme/app","files_changed":["a.py","b.py"]}"#
        );
        assert_eq!(entry.object_key(), "acme/app_log.json");
    }

    #[test]
    fn response_body_is_json_encoded_string() {
        let response = InvocationResponse::log_entry_created();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"statusCode": 200, "body": "\"Log entry created\""})
        );
    }
}
