//! Historical changeset count reconstruction.
//!
//! [`calc_counts`] replays each changeset's event history to produce one
//! aggregate [`ChangesetCounts`] snapshot per calendar-day boundary over
//! a `[start, end]` window. The computation is pure: it touches no I/O
//! and no clocks, and its output is independent of the iteration order
//! over changesets (each changeset's contribution is folded
//! independently and summed).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::Changeset;
use super::event::{ChangesetEvent, ChangesetEventKind, ReviewState};
use crate::error::GatewayError;

/// Aggregate counts across all tracked changesets at a single instant.
///
/// Derived and non-persistent; produced fresh on every reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangesetCounts {
    /// The sampled instant.
    pub time: DateTime<Utc>,
    /// Changesets that existed at this instant.
    pub total: i32,
    /// Changesets merged at or before this instant.
    pub merged: i32,
    /// Changesets closed (and not reopened or merged) at this instant.
    pub closed: i32,
    /// Changesets open at this instant.
    pub open: i32,
    /// Open changesets whose last review approved them.
    pub open_approved: i32,
    /// Open changesets whose last review requested changes.
    pub open_changes_requested: i32,
    /// Open changesets with a pending review.
    pub open_pending: i32,
}

impl ChangesetCounts {
    /// Returns a zeroed snapshot at the given instant.
    #[must_use]
    pub const fn at(time: DateTime<Utc>) -> Self {
        Self {
            time,
            total: 0,
            merged: 0,
            closed: 0,
            open: 0,
            open_approved: 0,
            open_changes_requested: 0,
            open_pending: 0,
        }
    }
}

impl fmt::Display for ChangesetCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Total: {}, Merged: {}, Closed: {}, Open: {}, OpenApproved: {}, OpenChangesRequested: {}, OpenPending: {})",
            self.time.to_rfc3339(),
            self.total,
            self.merged,
            self.closed,
            self.open,
            self.open_approved,
            self.open_changes_requested,
            self.open_pending,
        )
    }
}

/// Lifecycle phase of a single changeset while replaying its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Closed,
    Merged,
}

/// Running per-changeset state during replay.
///
/// `Merged` is terminal: once a changeset merges, no later event changes
/// its phase. That resolves the merge-vs-close tie at an identical
/// timestamp to merged, whichever order the two events are applied in.
/// The review outcome is a single mutually-exclusive field, so a later
/// review of a different outcome replaces the previous one instead of
/// being counted alongside it.
#[derive(Debug, Clone, Copy)]
struct RunningState {
    phase: Phase,
    review: Option<ReviewState>,
}

impl RunningState {
    const fn opened() -> Self {
        Self {
            phase: Phase::Open,
            review: None,
        }
    }

    fn apply(&mut self, kind: ChangesetEventKind) {
        if self.phase == Phase::Merged {
            return;
        }
        match kind {
            ChangesetEventKind::Closed => self.phase = Phase::Closed,
            ChangesetEventKind::Reopened => self.phase = Phase::Open,
            ChangesetEventKind::Merged => self.phase = Phase::Merged,
            ChangesetEventKind::Reviewed(ReviewState::Dismissed) => self.review = None,
            ChangesetEventKind::Reviewed(state) => self.review = Some(state),
        }
    }

    fn record(&self, counts: &mut ChangesetCounts) {
        counts.total += 1;
        match self.phase {
            Phase::Merged => counts.merged += 1,
            Phase::Closed => counts.closed += 1,
            Phase::Open => {
                counts.open += 1;
                match self.review {
                    Some(ReviewState::Approved) => counts.open_approved += 1,
                    Some(ReviewState::ChangesRequested) => counts.open_changes_requested += 1,
                    Some(ReviewState::Pending) => counts.open_pending += 1,
                    Some(ReviewState::Dismissed) | None => {}
                }
            }
        }
    }
}

/// Reconstructs daily aggregate counts over `[start, end]`.
///
/// One snapshot is produced per 24-hour step, walking backward from
/// `end` so the `end` instant is always sampled exactly, then reversed
/// to oldest-first. Events at a sampled instant are included in that
/// instant's snapshot. The result is all-or-nothing: any changeset
/// without an external creation time fails the whole computation.
///
/// # Errors
///
/// Returns [`GatewayError::MissingCreationTime`] if a changeset has no
/// `external_created_at`.
pub fn calc_counts(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    changesets: &[Changeset],
    events: &[ChangesetEvent],
) -> Result<Vec<ChangesetCounts>, GatewayError> {
    let mut counts: Vec<ChangesetCounts> = generate_timestamps(start, end)
        .into_iter()
        .map(ChangesetCounts::at)
        .collect();

    for changeset in changesets {
        let opened_at = changeset
            .external_created_at
            .ok_or(GatewayError::MissingCreationTime(changeset.id.value()))?;

        let mut history: Vec<&ChangesetEvent> = events
            .iter()
            .filter(|e| e.changeset_id == changeset.id)
            .collect();
        // Stable sort by timestamp; ties are resolved by the terminal
        // merge phase in `RunningState::apply`, not by slice order.
        history.sort_by_key(|e| e.timestamp);

        let mut state = RunningState::opened();
        let mut pending = history.iter().peekable();

        for count in &mut counts {
            if opened_at > count.time {
                // Not created yet; no events considered at this instant.
                continue;
            }
            while let Some(event) = pending.peek() {
                if event.timestamp > count.time {
                    break;
                }
                state.apply(event.kind);
                pending.next();
            }
            state.record(count);
        }
    }

    Ok(counts)
}

/// Sampled instants from `start` to `end` inclusive, oldest first.
///
/// Walks backward from `end` in fixed 24-hour steps while still at or
/// after `start`, then reverses, so the last instant is always exactly
/// `end` even when the span is not an integer number of days.
fn generate_timestamps(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut ts = Vec::new();
    let mut t = end;
    while t >= start {
        ts.push(t);
        t -= Duration::hours(24);
    }
    ts.reverse();
    ts
}
