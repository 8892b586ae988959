//! In-memory implementation of the store contract.
//!
//! Used when persistence is disabled and by tests. All collections live
//! behind a single [`tokio::sync::RwLock`]; the uniqueness guarantees
//! of the contract (changeset `(repo, external_id)`, event
//! `(changeset_id, kind, source_id)`) hold under concurrent access
//! because every mutation takes the write lock.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    ListChangesetEventsOpts, ListChangesetsOpts, ListExternalServicesOpts, Store, effective_limit,
};
use crate::domain::{Changeset, ChangesetEvent, ExternalService};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct Inner {
    external_services: Vec<ExternalService>,
    changesets: Vec<Changeset>,
    events: Vec<ChangesetEvent>,
    next_changeset_id: i64,
    next_event_id: i64,
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_external_services(
        &self,
        services: &[ExternalService],
    ) -> Result<(), GatewayError> {
        let mut inner = self.inner.write().await;
        for svc in services {
            let existing = inner
                .external_services
                .iter()
                .position(|s| s.id == svc.id);
            match existing {
                Some(idx) => {
                    if let Some(slot) = inner.external_services.get_mut(idx) {
                        *slot = svc.clone();
                    }
                }
                None => inner.external_services.push(svc.clone()),
            }
        }
        Ok(())
    }

    async fn list_external_services(
        &self,
        opts: ListExternalServicesOpts,
    ) -> Result<Vec<ExternalService>, GatewayError> {
        let inner = self.inner.read().await;
        Ok(inner
            .external_services
            .iter()
            .filter(|svc| opts.kind.is_none_or(|kind| svc.kind == kind))
            .cloned()
            .collect())
    }

    async fn create_changesets(&self, changesets: &[Changeset]) -> Result<(), GatewayError> {
        let mut inner = self.inner.write().await;
        for cs in changesets {
            let exists = inner.changesets.iter().any(|existing| {
                existing.repo.eq_ignore_ascii_case(&cs.repo)
                    && existing.external_id == cs.external_id
            });
            if exists {
                continue;
            }
            let mut cs = cs.clone();
            if cs.id.value() == 0 {
                inner.next_changeset_id += 1;
                cs.id = inner.next_changeset_id.into();
            }
            inner.changesets.push(cs);
        }
        Ok(())
    }

    async fn get_changeset(
        &self,
        repo: &str,
        external_id: &str,
    ) -> Result<Option<Changeset>, GatewayError> {
        let inner = self.inner.read().await;
        Ok(inner
            .changesets
            .iter()
            .find(|cs| cs.repo.eq_ignore_ascii_case(repo) && cs.external_id == external_id)
            .cloned())
    }

    async fn upsert_changeset_events(&self, events: &[ChangesetEvent]) -> Result<(), GatewayError> {
        let mut inner = self.inner.write().await;
        for event in events {
            let exists = inner.events.iter().any(|existing| {
                existing.changeset_id == event.changeset_id
                    && existing.kind == event.kind
                    && existing.source_id == event.source_id
            });
            // Redelivery leaves the stored record unchanged.
            if exists {
                continue;
            }
            let mut event = event.clone();
            inner.next_event_id += 1;
            event.id = inner.next_event_id;
            inner.events.push(event);
        }
        Ok(())
    }

    async fn list_changesets(
        &self,
        opts: ListChangesetsOpts,
    ) -> Result<Vec<Changeset>, GatewayError> {
        let inner = self.inner.read().await;
        let limit = usize::try_from(effective_limit(opts.limit)).unwrap_or(usize::MAX);
        Ok(inner.changesets.iter().take(limit).cloned().collect())
    }

    async fn list_changeset_events(
        &self,
        opts: ListChangesetEventsOpts,
    ) -> Result<Vec<ChangesetEvent>, GatewayError> {
        let inner = self.inner.read().await;
        let limit = usize::try_from(effective_limit(opts.limit)).unwrap_or(usize::MAX);
        Ok(inner
            .events
            .iter()
            .filter(|e| {
                opts.changeset_ids.is_empty() || opts.changeset_ids.contains(&e.changeset_id)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}
