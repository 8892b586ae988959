//! GitHub webhook payload schemas.
//!
//! Only the fields the translator needs are modeled; everything else in
//! the delivery is ignored by serde. Timestamps are optional where the
//! platform makes them action-dependent (`merged_at` is only set on a
//! merge, and so on).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository as it appears in webhook payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name` slug.
    pub full_name: String,
}

/// Pull request as it appears in webhook payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Host-side id of the pull request object.
    pub id: i64,
    /// Pull request number within the repository.
    pub number: i64,
    /// Lifecycle state string (`open`/`closed`).
    #[serde(default)]
    pub state: Option<String>,
    /// Whether a `closed` action merged the pull request.
    #[serde(default)]
    pub merged: Option<bool>,
    /// When the pull request was opened.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// When the pull request was merged, if it was.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// When the pull request was closed, if it was.
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

/// `pull_request` event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestPayload {
    /// What happened (`closed`, `reopened`, `labeled`, ...).
    pub action: String,
    /// The pull request the action applies to.
    pub pull_request: PullRequest,
    /// The repository the pull request belongs to.
    pub repository: Repository,
}

/// Review object inside a `pull_request_review` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Host-side id of the review, stable across redelivery and edits.
    pub id: i64,
    /// Review outcome string (`approved`, `changes_requested`, ...).
    pub state: String,
    /// When the review was submitted or last updated.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// `pull_request_review` event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPayload {
    /// What happened (`submitted`, `edited`, `dismissed`, ...).
    pub action: String,
    /// The review itself.
    pub review: Review,
    /// The reviewed pull request.
    pub pull_request: PullRequest,
    /// The repository the pull request belongs to.
    pub repository: Repository,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn pull_request_payload_ignores_unknown_fields() {
        let raw = serde_json::json!({
            "action": "closed",
            "sender": {"login": "octocat"},
            "pull_request": {
                "id": 1,
                "number": 7,
                "merged": true,
                "html_url": "https://github.com/acme/widgets/pull/7"
            },
            "repository": {"full_name": "acme/widgets", "private": false}
        });
        let parsed: Result<PullRequestPayload, _> = serde_json::from_value(raw);
        let Ok(payload) = parsed else {
            panic!("payload should parse");
        };
        assert_eq!(payload.pull_request.number, 7);
        assert_eq!(payload.repository.full_name, "acme/widgets");
    }

    #[test]
    fn review_payload_requires_review_object() {
        let raw = serde_json::json!({
            "action": "submitted",
            "pull_request": {"id": 1, "number": 7},
            "repository": {"full_name": "acme/widgets"}
        });
        let parsed: Result<ReviewPayload, _> = serde_json::from_value(raw);
        assert!(parsed.is_err());
    }
}
