//! Tracked changeset and its type-safe identifier.
//!
//! [`ChangesetId`] is a newtype wrapper around the store-assigned `i64`
//! key providing type safety so that changeset identifiers cannot be
//! confused with other row ids.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a tracked changeset.
///
/// Wraps the store-assigned `i64` primary key. Used as the grouping key
/// for event replay and the foreign key on [`super::ChangesetEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangesetId(i64);

impl ChangesetId {
    /// Creates a `ChangesetId` from a raw store key.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner `i64` key.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChangesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChangesetId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ChangesetId> for i64 {
    fn from(id: ChangesetId) -> Self {
        id.0
    }
}

/// A tracked unit of review mirroring a pull request on the code host.
///
/// Created when the repository syncer first discovers the pull request
/// (out of scope here), updated by event ingestion, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changeset {
    /// Store-assigned identifier.
    pub id: ChangesetId,
    /// Owning repository slug on the code host (`owner/name`).
    pub repo: String,
    /// Identifier on the code host (pull request number as a string).
    pub external_id: String,
    /// When the changeset was opened on the code host. This is the
    /// authoritative "opened" instant for reconstruction; a changeset
    /// without it cannot be replayed.
    pub external_created_at: Option<DateTime<Utc>>,
    /// Platform-specific metadata blob, stored as delivered.
    pub metadata: serde_json::Value,
}
