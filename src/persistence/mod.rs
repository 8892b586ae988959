//! Persistence layer: the store contract and its implementations.
//!
//! [`Store`] is the narrow read/write contract the gateway consumes.
//! The store is treated as an already-consistent, already-transactional
//! collaborator: in particular, the event upsert is required to be safe
//! under concurrent redelivery of the same event (uniqueness on
//! `(changeset_id, kind, source_id)`).
//!
//! Implementations: [`postgres::PostgresStore`] for durable storage and
//! [`memory::MemoryStore`] for tests and persistence-disabled runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{Changeset, ChangesetEvent, ChangesetId, ExternalService, ExternalServiceKind};
use crate::error::GatewayError;

/// Default page bound applied when a list call passes no limit.
pub const DEFAULT_LIST_LIMIT: i64 = 1000;

/// Options for [`Store::list_external_services`].
#[derive(Debug, Clone, Default)]
pub struct ListExternalServicesOpts {
    /// Restrict to services of this platform kind.
    pub kind: Option<ExternalServiceKind>,
}

/// Options for [`Store::list_changesets`].
#[derive(Debug, Clone, Default)]
pub struct ListChangesetsOpts {
    /// Maximum rows to return; `0` applies [`DEFAULT_LIST_LIMIT`].
    pub limit: i64,
}

/// Options for [`Store::list_changeset_events`].
#[derive(Debug, Clone, Default)]
pub struct ListChangesetEventsOpts {
    /// Restrict to events of these changesets; empty means all.
    pub changeset_ids: Vec<ChangesetId>,
    /// Maximum rows to return; `0` applies [`DEFAULT_LIST_LIMIT`].
    pub limit: i64,
}

/// Narrow store contract consumed by the gateway.
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Inserts or updates external service configurations by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure.
    async fn upsert_external_services(
        &self,
        services: &[ExternalService],
    ) -> Result<(), GatewayError>;

    /// Lists configured external services, optionally filtered by kind.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure.
    async fn list_external_services(
        &self,
        opts: ListExternalServicesOpts,
    ) -> Result<Vec<ExternalService>, GatewayError>;

    /// Creates changesets, skipping rows whose `(repo, external_id)`
    /// already exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure.
    async fn create_changesets(&self, changesets: &[Changeset]) -> Result<(), GatewayError>;

    /// Looks up a changeset by repository slug and host-side id.
    /// The repository comparison is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure.
    async fn get_changeset(
        &self,
        repo: &str,
        external_id: &str,
    ) -> Result<Option<Changeset>, GatewayError>;

    /// Idempotently inserts changeset events. An event whose
    /// `(changeset_id, kind, source_id)` already exists leaves the
    /// stored record unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure.
    async fn upsert_changeset_events(&self, events: &[ChangesetEvent]) -> Result<(), GatewayError>;

    /// Lists tracked changesets.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure.
    async fn list_changesets(
        &self,
        opts: ListChangesetsOpts,
    ) -> Result<Vec<Changeset>, GatewayError>;

    /// Lists changeset events.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure.
    async fn list_changeset_events(
        &self,
        opts: ListChangesetEventsOpts,
    ) -> Result<Vec<ChangesetEvent>, GatewayError>;
}

/// Resolves a caller-supplied limit to an effective page bound.
pub(crate) fn effective_limit(limit: i64) -> i64 {
    if limit <= 0 { DEFAULT_LIST_LIMIT } else { limit }
}
