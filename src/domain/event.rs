//! Changeset events: immutable state-transition facts.
//!
//! [`ChangesetEventKind`] is a closed enumeration. Platform event types
//! outside it never construct a kind: the translator reports them as
//! unrecognized and the gateway acknowledges without persisting, so new
//! host-side event types fail closed instead of crashing ingestion.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ChangesetId;

/// Outcome of a code review, mutually exclusive per changeset.
///
/// Conceptually a single optional field overlaid on the open state:
/// a later review of a different outcome replaces the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    /// Reviewer approved the changes.
    Approved,
    /// Reviewer requested changes.
    ChangesRequested,
    /// Review started but not yet submitted with an outcome.
    Pending,
    /// A previously submitted review was dismissed.
    Dismissed,
}

impl ReviewState {
    /// Parses a host-side review state string, case-insensitively.
    ///
    /// Returns `None` for states outside the enumeration so unknown
    /// review outcomes degrade to a no-op instead of an error.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "approved" => Some(Self::Approved),
            "changes_requested" => Some(Self::ChangesRequested),
            "pending" => Some(Self::Pending),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }
}

/// Kind of state transition recorded by a [`ChangesetEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangesetEventKind {
    /// The changeset was closed without merging.
    Closed,
    /// A closed changeset was reopened.
    Reopened,
    /// The changeset was merged. Terminal.
    Merged,
    /// A review was submitted or updated with the given outcome.
    Reviewed(ReviewState),
}

impl ChangesetEventKind {
    /// Returns the flat string discriminator used for storage and
    /// deduplication.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Merged => "merged",
            Self::Reviewed(ReviewState::Approved) => "reviewed_approved",
            Self::Reviewed(ReviewState::ChangesRequested) => "reviewed_changes_requested",
            Self::Reviewed(ReviewState::Pending) => "reviewed_pending",
            Self::Reviewed(ReviewState::Dismissed) => "reviewed_dismissed",
        }
    }

    /// Parses a storage discriminator back into a kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "closed" => Some(Self::Closed),
            "reopened" => Some(Self::Reopened),
            "merged" => Some(Self::Merged),
            "reviewed_approved" => Some(Self::Reviewed(ReviewState::Approved)),
            "reviewed_changes_requested" => Some(Self::Reviewed(ReviewState::ChangesRequested)),
            "reviewed_pending" => Some(Self::Reviewed(ReviewState::Pending)),
            "reviewed_dismissed" => Some(Self::Reviewed(ReviewState::Dismissed)),
            _ => None,
        }
    }
}

impl fmt::Display for ChangesetEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChangesetEventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChangesetEventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| D::Error::custom(format!("unknown event kind: {s}")))
    }
}

/// An immutable fact about a state transition of a changeset.
///
/// Append-only. Deduplicated on ingestion by
/// `(changeset_id, kind, source_id)`: redelivery of an already-seen
/// event leaves the existing record unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangesetEvent {
    /// Store-assigned identifier; `0` until persisted.
    pub id: i64,
    /// Owning changeset.
    pub changeset_id: ChangesetId,
    /// What happened.
    pub kind: ChangesetEventKind,
    /// Identity of the event on the code host, stable across redelivery.
    pub source_id: String,
    /// When the transition happened on the code host.
    pub timestamp: DateTime<Utc>,
    /// Kind-specific metadata blob.
    pub metadata: serde_json::Value,
    /// Gateway-side record creation time.
    pub created_at: DateTime<Utc>,
    /// Gateway-side record update time.
    pub updated_at: DateTime<Utc>,
}
