//! DTOs for the counts reporting endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ChangesetCounts;

/// Query window for the counts endpoint. Both bounds are RFC 3339.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CountsWindowParams {
    /// Window start; defaults to thirty days before `to`.
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Window end; defaults to now.
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

/// One reconstructed snapshot of aggregate changeset counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChangesetCountsDto {
    /// The sampled instant.
    pub time: DateTime<Utc>,
    /// Changesets that existed at this instant.
    pub total: i32,
    /// Changesets merged at or before this instant.
    pub merged: i32,
    /// Changesets closed at this instant.
    pub closed: i32,
    /// Changesets open at this instant.
    pub open: i32,
    /// Open changesets last reviewed as approved.
    pub open_approved: i32,
    /// Open changesets last reviewed as changes requested.
    pub open_changes_requested: i32,
    /// Open changesets with a pending review.
    pub open_pending: i32,
}

impl From<ChangesetCounts> for ChangesetCountsDto {
    fn from(c: ChangesetCounts) -> Self {
        Self {
            time: c.time,
            total: c.total,
            merged: c.merged,
            closed: c.closed,
            open: c.open,
            open_approved: c.open_approved,
            open_changes_requested: c.open_changes_requested,
            open_pending: c.open_pending,
        }
    }
}
