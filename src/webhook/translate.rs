//! Translation of platform webhook payloads into changeset event drafts.
//!
//! Event types outside the tracked enumeration are reported as
//! [`Translated::Unrecognized`] and acknowledged without persistence;
//! hosting platforms add new event types regularly and a delivery must
//! never fail for that. A payload of a known type that does not parse
//! is a hard [`GatewayError::MalformedPayload`] so the sender can retry
//! or alert.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::payload::{PullRequestPayload, ReviewPayload};
use crate::domain::{ChangesetEventKind, ReviewState};
use crate::error::GatewayError;

/// `X-GitHub-Event` value for pull request lifecycle events.
pub const EVENT_PULL_REQUEST: &str = "pull_request";
/// `X-GitHub-Event` value for pull request review events.
pub const EVENT_PULL_REQUEST_REVIEW: &str = "pull_request_review";

/// A normalized changeset event draft, before the owning changeset is
/// resolved against the store.
#[derive(Debug, Clone)]
pub struct TranslatedEvent {
    /// `owner/name` of the repository the delivery is about.
    pub repo_full_name: String,
    /// Host-side changeset identity (pull request number as a string).
    pub external_changeset_id: String,
    /// Normalized event kind.
    pub kind: ChangesetEventKind,
    /// Host-side event identity, stable across redelivery.
    pub source_id: String,
    /// When the transition happened on the host.
    pub timestamp: DateTime<Utc>,
    /// Kind-specific metadata carried along for storage.
    pub metadata: Value,
}

/// Result of translating a delivery.
#[derive(Debug, Clone)]
pub enum Translated {
    /// The delivery maps to a tracked event kind.
    Event(TranslatedEvent),
    /// The event type or action is outside the tracked enumeration;
    /// acknowledge and do nothing.
    Unrecognized,
}

/// Translates a delivery's event-type header and raw body.
///
/// # Errors
///
/// Returns [`GatewayError::MalformedPayload`] when a payload of a known
/// event type fails to parse or lacks its transition timestamp.
pub fn translate(event_type: &str, body: &[u8]) -> Result<Translated, GatewayError> {
    match event_type {
        EVENT_PULL_REQUEST => translate_pull_request(body),
        EVENT_PULL_REQUEST_REVIEW => translate_review(body),
        _ => Ok(Translated::Unrecognized),
    }
}

fn translate_pull_request(body: &[u8]) -> Result<Translated, GatewayError> {
    let payload: PullRequestPayload = serde_json::from_slice(body)
        .map_err(|err| GatewayError::MalformedPayload(format!("pull_request: {err}")))?;
    let pr = &payload.pull_request;

    let (kind, timestamp) = match payload.action.as_str() {
        "closed" if pr.merged.unwrap_or(false) => {
            (ChangesetEventKind::Merged, pr.merged_at.or(pr.closed_at))
        }
        "closed" => (ChangesetEventKind::Closed, pr.closed_at.or(pr.updated_at)),
        "reopened" => (ChangesetEventKind::Reopened, pr.updated_at),
        _ => return Ok(Translated::Unrecognized),
    };

    let timestamp = timestamp.ok_or_else(|| {
        GatewayError::MalformedPayload(format!(
            "pull_request {} payload has no transition timestamp",
            payload.action
        ))
    })?;

    // Stable across redelivery, distinct for a genuine second transition
    // of the same kind (those carry a later timestamp).
    let source_id = format!("{}:{}:{}", pr.id, payload.action, timestamp.timestamp());

    Ok(Translated::Event(TranslatedEvent {
        repo_full_name: payload.repository.full_name.clone(),
        external_changeset_id: pr.number.to_string(),
        kind,
        source_id,
        timestamp,
        metadata: serde_json::to_value(pr).unwrap_or(Value::Null),
    }))
}

fn translate_review(body: &[u8]) -> Result<Translated, GatewayError> {
    let payload: ReviewPayload = serde_json::from_slice(body)
        .map_err(|err| GatewayError::MalformedPayload(format!("pull_request_review: {err}")))?;

    let state = match payload.action.as_str() {
        // A dismissal clears the recorded outcome whatever the review's
        // state string says.
        "dismissed" => ReviewState::Dismissed,
        "submitted" | "edited" => {
            // Review states outside the enumeration (e.g. "commented")
            // are a no-op, not an error.
            match ReviewState::parse(&payload.review.state) {
                Some(state) => state,
                None => return Ok(Translated::Unrecognized),
            }
        }
        _ => return Ok(Translated::Unrecognized),
    };

    // The review's own update time is authoritative, not the delivery
    // time of the wrapping webhook.
    let timestamp = payload.review.submitted_at.ok_or_else(|| {
        GatewayError::MalformedPayload("review payload has no submitted_at".to_string())
    })?;

    Ok(Translated::Event(TranslatedEvent {
        repo_full_name: payload.repository.full_name.clone(),
        external_changeset_id: payload.pull_request.number.to_string(),
        kind: ChangesetEventKind::Reviewed(state),
        source_id: payload.review.id.to_string(),
        timestamp,
        metadata: serde_json::to_value(&payload.review).unwrap_or(Value::Null),
    }))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(secs: i64) -> DateTime<Utc> {
        match Utc.timestamp_opt(secs, 0) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    fn pr_body(action: &str, merged: bool) -> Vec<u8> {
        json!({
            "action": action,
            "pull_request": {
                "id": 101,
                "number": 7,
                "merged": merged,
                "created_at": ts(1_000).to_rfc3339(),
                "updated_at": ts(5_000).to_rfc3339(),
                "merged_at": if merged { Some(ts(4_000).to_rfc3339()) } else { None },
                "closed_at": ts(4_500).to_rfc3339(),
            },
            "repository": {"full_name": "acme/widgets"}
        })
        .to_string()
        .into_bytes()
    }

    fn expect_event(translated: Translated) -> TranslatedEvent {
        match translated {
            Translated::Event(event) => event,
            Translated::Unrecognized => panic!("expected a translated event"),
        }
    }

    #[test]
    fn closed_with_merged_flag_becomes_merged() {
        let Ok(translated) = translate(EVENT_PULL_REQUEST, &pr_body("closed", true)) else {
            panic!("translation failed");
        };
        let event = expect_event(translated);
        assert_eq!(event.kind, ChangesetEventKind::Merged);
        assert_eq!(event.timestamp, ts(4_000));
        assert_eq!(event.external_changeset_id, "7");
        assert_eq!(event.repo_full_name, "acme/widgets");
    }

    #[test]
    fn closed_without_merged_flag_becomes_closed() {
        let Ok(translated) = translate(EVENT_PULL_REQUEST, &pr_body("closed", false)) else {
            panic!("translation failed");
        };
        let event = expect_event(translated);
        assert_eq!(event.kind, ChangesetEventKind::Closed);
        assert_eq!(event.timestamp, ts(4_500));
    }

    #[test]
    fn reopened_uses_update_time() {
        let Ok(translated) = translate(EVENT_PULL_REQUEST, &pr_body("reopened", false)) else {
            panic!("translation failed");
        };
        let event = expect_event(translated);
        assert_eq!(event.kind, ChangesetEventKind::Reopened);
        assert_eq!(event.timestamp, ts(5_000));
    }

    #[test]
    fn untracked_pull_request_action_is_unrecognized() {
        let Ok(translated) = translate(EVENT_PULL_REQUEST, &pr_body("labeled", false)) else {
            panic!("translation failed");
        };
        assert!(matches!(translated, Translated::Unrecognized));
    }

    #[test]
    fn unknown_event_type_is_unrecognized() {
        let Ok(translated) = translate("issue_comment", b"{\"action\":\"edited\"}") else {
            panic!("translation failed");
        };
        assert!(matches!(translated, Translated::Unrecognized));
    }

    #[test]
    fn malformed_known_type_is_an_error() {
        let result = translate(EVENT_PULL_REQUEST, b"{\"action\":\"closed\"}");
        assert!(matches!(result, Err(GatewayError::MalformedPayload(_))));
    }

    #[test]
    fn source_id_is_stable_across_redelivery() {
        let body = pr_body("closed", true);
        let Ok(first) = translate(EVENT_PULL_REQUEST, &body) else {
            panic!("translation failed");
        };
        let Ok(second) = translate(EVENT_PULL_REQUEST, &body) else {
            panic!("translation failed");
        };
        assert_eq!(expect_event(first).source_id, expect_event(second).source_id);
    }

    fn review_body(action: &str, state: &str) -> Vec<u8> {
        json!({
            "action": action,
            "review": {
                "id": 900,
                "state": state,
                "submitted_at": ts(3_000).to_rfc3339(),
            },
            "pull_request": {"id": 101, "number": 7},
            "repository": {"full_name": "acme/widgets"}
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn submitted_review_refines_kind_by_state() {
        let cases = [
            ("APPROVED", ReviewState::Approved),
            ("changes_requested", ReviewState::ChangesRequested),
            ("Pending", ReviewState::Pending),
        ];
        for (raw, want) in cases {
            let Ok(translated) = translate(EVENT_PULL_REQUEST_REVIEW, &review_body("submitted", raw))
            else {
                panic!("translation failed");
            };
            let event = expect_event(translated);
            assert_eq!(event.kind, ChangesetEventKind::Reviewed(want));
            assert_eq!(event.timestamp, ts(3_000));
            assert_eq!(event.source_id, "900");
        }
    }

    #[test]
    fn commented_review_state_is_unrecognized() {
        let Ok(translated) = translate(EVENT_PULL_REQUEST_REVIEW, &review_body("submitted", "commented"))
        else {
            panic!("translation failed");
        };
        assert!(matches!(translated, Translated::Unrecognized));
    }

    #[test]
    fn dismissed_review_action_clears_outcome() {
        let Ok(translated) = translate(EVENT_PULL_REQUEST_REVIEW, &review_body("dismissed", "dismissed"))
        else {
            panic!("translation failed");
        };
        let event = expect_event(translated);
        assert_eq!(
            event.kind,
            ChangesetEventKind::Reviewed(ReviewState::Dismissed)
        );
    }

    #[test]
    fn malformed_review_payload_is_an_error() {
        let result = translate(EVENT_PULL_REQUEST_REVIEW, b"{\"action\":\"submitted\"}");
        assert!(matches!(result, Err(GatewayError::MalformedPayload(_))));
    }
}
