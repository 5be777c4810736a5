//! Webhook event decoding and payload shape detection

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChangeLogError, Result};

/// Invocation wrapper as delivered by a serverless-style gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub body: EventBody,
}

/// The event body is either still JSON-encoded or already decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventBody {
    Encoded(String),
    Decoded(Value),
}

impl EventBody {
    /// Parse an encoded body, or hand back an already decoded one.
    pub fn decode(self) -> Result<Value> {
        let value = match self {
            EventBody::Encoded(raw) => serde_json::from_str(&raw).map_err(|e| {
                ChangeLogError::MalformedPayload(format!("body is not valid JSON: {}", e))
            })?,
            EventBody::Decoded(value) => value,
        };

        if !value.is_object() {
            return Err(ChangeLogError::MalformedPayload(
                "body must be a JSON object".to_string(),
            ));
        }
        Ok(value)
    }
}

/// Inline commit carried by a push event.
#[derive(Debug, Clone, PartialEq)]
pub struct PushCommit {
    pub modified: Vec<String>,
}

/// The two payload shapes this service understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Push {
        repository: String,
        commits: Vec<PushCommit>,
    },
    PullRequest {
        repository: String,
        commits_url: String,
    },
}

impl Payload {
    /// Detect the payload shape by key presence: `pull_request` wins over `commits`.
    pub fn from_value(payload: &Value) -> Result<Self> {
        if let Some(pull_request) = payload.get("pull_request") {
            let commits_url = pull_request
                .get("commits_url")
                .and_then(|u| u.as_str())
                .ok_or_else(|| ChangeLogError::missing_field("pull_request.commits_url"))?;

            return Ok(Payload::PullRequest {
                repository: repository_field(payload, "name")?,
                commits_url: commits_url.to_string(),
            });
        }

        if let Some(commits) = payload.get("commits") {
            let repository = repository_field(payload, "full_name")
                .or_else(|e| repository_field(payload, "name").map_err(|_| e))?;
            let commits = commits
                .as_array()
                .ok_or_else(|| {
                    ChangeLogError::MalformedPayload("'commits' must be an array".to_string())
                })?
                .iter()
                .enumerate()
                .map(|(idx, commit)| push_commit(idx, commit))
                .collect::<Result<Vec<_>>>()?;

            return Ok(Payload::Push {
                repository,
                commits,
            });
        }

        Err(ChangeLogError::MalformedPayload(
            "payload has neither 'pull_request' nor 'commits'".to_string(),
        ))
    }

    pub fn repository(&self) -> &str {
        match self {
            Payload::Push { repository, .. } | Payload::PullRequest { repository, .. } => {
                repository
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Push { .. } => "push",
            Payload::PullRequest { .. } => "pull_request",
        }
    }
}

/// Push events are keyed on `repository.full_name` (falling back to `name`),
/// pull requests on `repository.name`.
fn repository_field(payload: &Value, field: &str) -> Result<String> {
    let repository = payload
        .get("repository")
        .ok_or_else(|| ChangeLogError::missing_field("repository"))?;

    repository
        .get(field)
        .and_then(|n| n.as_str())
        .map(String::from)
        .ok_or_else(|| ChangeLogError::missing_field(&format!("repository.{}", field)))
}

fn push_commit(idx: usize, commit: &Value) -> Result<PushCommit> {
    let modified = commit
        .get("modified")
        .and_then(|m| m.as_array())
        .ok_or_else(|| ChangeLogError::missing_field(&format!("commits[{}].modified", idx)))?;

    let modified = modified
        .iter()
        .map(|path| {
            path.as_str().map(String::from).ok_or_else(|| {
                ChangeLogError::MalformedPayload(format!(
                    "commits[{}].modified contains a non-string entry",
                    idx
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PushCommit { modified })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encoded_and_decoded_bodies_decode_to_the_same_value() {
        let payload = json!({"repository": {"full_name": "acme/app"}, "commits": []});
        let encoded = EventBody::Encoded(payload.to_string()).decode().unwrap();
        let decoded = EventBody::Decoded(payload.clone()).decode().unwrap();
        assert_eq!(encoded, payload);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn wrapper_accepts_string_or_object_body() {
        let event: WebhookEvent = serde_json::from_str(r#"{"body": "{\"a\": 1}"}"#).unwrap();
        assert!(matches!(event.body, EventBody::Encoded(_)));

        let event: WebhookEvent = serde_json::from_str(r#"{"body": {"a": 1}}"#).unwrap();
        assert!(matches!(event.body, EventBody::Decoded(_)));
    }

    #[test]
    fn invalid_json_string_is_malformed() {
        let err = EventBody::Encoded("{not json".into()).decode().unwrap_err();
        assert!(matches!(err, ChangeLogError::MalformedPayload(_)));
    }

    #[test]
    fn non_object_body_is_malformed() {
        let err = EventBody::Decoded(json!([1, 2])).decode().unwrap_err();
        assert!(matches!(err, ChangeLogError::MalformedPayload(_)));
    }

    #[test]
    fn detects_push_shape() {
        let payload = json!({
            "repository": {"full_name": "acme/app", "name": "app"},
            "commits": [{"modified": ["a.py", "b.py"]}, {"modified": []}]
        });
        let parsed = Payload::from_value(&payload).unwrap();
        assert_eq!(
            parsed,
            Payload::Push {
                repository: "acme/app".into(),
                commits: vec![
                    PushCommit {
                        modified: vec!["a.py".into(), "b.py".into()]
                    },
                    PushCommit { modified: vec![] },
                ],
            }
        );
        assert_eq!(parsed.kind(), "push");
    }

    #[test]
    fn detects_pull_request_shape_and_reads_name() {
        let payload = json!({
            "pull_request": {"commits_url": "https://api.github.com/repos/acme/app/pulls/1/commits"},
            "repository": {"name": "app"},
            "commits": [{"modified": ["ignored"]}]
        });
        let parsed = Payload::from_value(&payload).unwrap();
        assert_eq!(parsed.repository(), "app");
        assert_eq!(parsed.kind(), "pull_request");
    }

    #[test]
    fn pull_request_keys_on_name_even_when_full_name_is_present() {
        let payload = json!({
            "action": "opened",
            "pull_request": {"commits_url": "https://api.github.com/repos/acme/app/pulls/1/commits"},
            "repository": {"name": "app", "full_name": "acme/app"}
        });
        let parsed = Payload::from_value(&payload).unwrap();
        assert_eq!(parsed.repository(), "app");
    }

    #[test]
    fn pull_request_without_name_is_malformed() {
        let payload = json!({
            "pull_request": {"commits_url": "https://api.github.com/repos/acme/app/pulls/1/commits"},
            "repository": {"full_name": "acme/app"}
        });
        let err = Payload::from_value(&payload).unwrap_err();
        assert!(err.to_string().contains("repository.name"));
    }

    #[test]
    fn push_falls_back_to_name() {
        let payload = json!({
            "repository": {"name": "app"},
            "commits": [{"modified": ["a.py"]}]
        });
        assert_eq!(Payload::from_value(&payload).unwrap().repository(), "app");
    }

    #[test]
    fn missing_repository_is_malformed() {
        let payload = json!({"commits": [{"modified": ["a.py"]}]});
        let err = Payload::from_value(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed payload: missing field 'repository'"
        );
    }

    #[test]
    fn commit_without_modified_is_malformed() {
        let payload = json!({
            "repository": {"full_name": "acme/app"},
            "commits": [{"modified": ["a.py"]}, {"added": ["b.py"]}]
        });
        let err = Payload::from_value(&payload).unwrap_err();
        assert!(err.to_string().contains("commits[1].modified"));
    }

    #[test]
    fn non_string_paths_are_rejected() {
        let payload = json!({
            "repository": {"full_name": "acme/app"},
            "commits": [{"modified": ["a.py", 7]}]
        });
        assert!(Payload::from_value(&payload).is_err());
    }

    #[test]
    fn pull_request_without_commits_url_is_malformed() {
        let payload = json!({"pull_request": {}, "repository": {"name": "app"}});
        let err = Payload::from_value(&payload).unwrap_err();
        assert!(err.to_string().contains("pull_request.commits_url"));
    }

    #[test]
    fn unknown_shape_is_malformed() {
        let payload = json!({"repository": {"full_name": "acme/app"}, "zen": "hi"});
        assert!(Payload::from_value(&payload).is_err());
    }
}
