//! Reporting entry point for historical count reconstruction.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{ChangesetCounts, ChangesetId, Clock, calc_counts};
use crate::error::GatewayError;
use crate::persistence::{ListChangesetEventsOpts, ListChangesetsOpts, Store};

/// Page bound for reconstruction reads. Reconstruction needs the full
/// event history, so the bound is deliberately generous.
const RECONSTRUCTION_LIST_LIMIT: i64 = 10_000;

/// Default window length when the caller gives no start.
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Loads tracked changesets and their events and replays them into
/// daily count snapshots.
#[derive(Debug, Clone)]
pub struct CountsService {
    store: Arc<dyn Store>,
    clock: Clock,
}

impl CountsService {
    /// Creates a new `CountsService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Reconstructs daily counts over `[start, end]`.
    ///
    /// `end` defaults to the injected clock's now and `start` to
    /// thirty days before `end`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRequest`] when the window is inverted.
    /// - [`GatewayError::MissingCreationTime`] when a changeset cannot
    ///   be replayed; no partial result is returned.
    /// - [`GatewayError::PersistenceError`] on store failure.
    pub async fn counts_over_window(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChangesetCounts>, GatewayError> {
        let end = end.unwrap_or_else(|| self.clock.now());
        let start = start.unwrap_or(end - Duration::days(DEFAULT_WINDOW_DAYS));
        if start > end {
            return Err(GatewayError::InvalidRequest(format!(
                "window start {start} is after end {end}"
            )));
        }

        let changesets = self
            .store
            .list_changesets(ListChangesetsOpts {
                limit: RECONSTRUCTION_LIST_LIMIT,
            })
            .await?;
        let changeset_ids: Vec<ChangesetId> = changesets.iter().map(|cs| cs.id).collect();
        let events = self
            .store
            .list_changeset_events(ListChangesetEventsOpts {
                changeset_ids,
                limit: RECONSTRUCTION_LIST_LIMIT,
            })
            .await?;

        tracing::debug!(
            changesets = changesets.len(),
            events = events.len(),
            %start,
            %end,
            "reconstructing changeset counts"
        );
        calc_counts(start, end, &changesets, &events)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Changeset, ChangesetEvent, ChangesetEventKind};
    use crate::persistence::memory::MemoryStore;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc::now()
    }

    async fn seeded_service(now: DateTime<Utc>) -> CountsService {
        let store = Arc::new(MemoryStore::new());
        let cs = Changeset {
            id: ChangesetId::new(0),
            repo: "acme/widgets".to_string(),
            external_id: "7".to_string(),
            external_created_at: Some(now - Duration::days(2)),
            metadata: json!({}),
        };
        let Ok(()) = store.create_changesets(&[cs]).await else {
            panic!("seed failed");
        };
        let merged = ChangesetEvent {
            id: 0,
            changeset_id: ChangesetId::new(1),
            kind: ChangesetEventKind::Merged,
            source_id: "101:closed:1".to_string(),
            timestamp: now - Duration::days(1),
            metadata: json!({}),
            created_at: now,
            updated_at: now,
        };
        let Ok(()) = store.upsert_changeset_events(&[merged]).await else {
            panic!("seed failed");
        };
        CountsService::new(store as Arc<dyn Store>, Clock::fixed(now))
    }

    #[tokio::test]
    async fn reconstructs_over_explicit_window() {
        let now = fixed_now();
        let service = seeded_service(now).await;

        let Ok(counts) = service
            .counts_over_window(Some(now - Duration::days(2)), Some(now))
            .await
        else {
            panic!("reconstruction failed");
        };
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.first().map(|c| (c.total, c.open)), Some((1, 1)));
        assert_eq!(counts.last().map(|c| (c.total, c.merged)), Some((1, 1)));
    }

    #[tokio::test]
    async fn end_defaults_to_clock_now() {
        let now = fixed_now();
        let service = seeded_service(now).await;

        let Ok(counts) = service
            .counts_over_window(Some(now - Duration::days(1)), None)
            .await
        else {
            panic!("reconstruction failed");
        };
        assert_eq!(counts.last().map(|c| c.time), Some(now));
    }

    #[tokio::test]
    async fn default_window_spans_thirty_days() {
        let now = fixed_now();
        let service = seeded_service(now).await;

        let Ok(counts) = service.counts_over_window(None, None).await else {
            panic!("reconstruction failed");
        };
        assert_eq!(counts.len(), 31);
    }

    #[tokio::test]
    async fn inverted_window_is_rejected() {
        let now = fixed_now();
        let service = seeded_service(now).await;

        let result = service
            .counts_over_window(Some(now), Some(now - Duration::days(1)))
            .await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn missing_creation_time_propagates() {
        let now = fixed_now();
        let store = Arc::new(MemoryStore::new());
        let cs = Changeset {
            id: ChangesetId::new(0),
            repo: "acme/widgets".to_string(),
            external_id: "9".to_string(),
            external_created_at: None,
            metadata: json!({}),
        };
        let Ok(()) = store.create_changesets(&[cs]).await else {
            panic!("seed failed");
        };
        let service = CountsService::new(store as Arc<dyn Store>, Clock::fixed(now));

        let result = service.counts_over_window(None, None).await;
        assert!(matches!(
            result,
            Err(GatewayError::MissingCreationTime(_))
        ));
    }
}
