//! Webhook ingestion orchestration.
//!
//! [`WebhookService::process`] runs a delivery through sequential gates:
//! authenticate → translate → scope-check → changeset lookup →
//! idempotent persistence. A later gate never runs when an earlier one
//! fails, and nothing is written before the final gate.

use std::sync::Arc;

use crate::domain::{
    ChangesetEvent, ChangesetEventKind, ChangesetId, Clock, ExternalServiceKind, SecretResolver,
};
use crate::error::GatewayError;
use crate::persistence::{ListExternalServicesOpts, Store};
use crate::webhook::signature;
use crate::webhook::{Translated, translate};

/// Why a delivery was acknowledged without persisting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The event type or action is outside the tracked enumeration.
    UnrecognizedEvent,
    /// The event references a changeset the store does not know yet.
    /// Redelivery and ingestion racing ahead of repository discovery
    /// are both expected, so this is not an error.
    UnknownChangeset,
}

/// Outcome of processing one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The event was translated, matched, and upserted.
    Persisted {
        /// Changeset the event was recorded against.
        changeset_id: ChangesetId,
        /// Normalized kind of the recorded event.
        kind: ChangesetEventKind,
    },
    /// The delivery was acknowledged with no store write.
    Skipped(SkipReason),
}

/// Orchestrates webhook ingestion against the store.
///
/// Holds no mutable state of its own; every request is independent and
/// concurrency safety of the event upsert is the store's contract.
#[derive(Debug, Clone)]
pub struct WebhookService {
    store: Arc<dyn Store>,
    clock: Clock,
}

impl WebhookService {
    /// Creates a new `WebhookService`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Processes one inbound GitHub delivery.
    ///
    /// `body` must be the exact request bytes: signatures are computed
    /// over the wire form, so verification happens before any JSON
    /// parsing.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Unauthorized`] when no configured secret
    ///   verifies the signature, or no verified webhook entry covers
    ///   the payload's repository.
    /// - [`GatewayError::MalformedPayload`] when a known event type
    ///   fails to parse.
    /// - [`GatewayError::PersistenceError`] on store failure.
    pub async fn process(
        &self,
        event_type: &str,
        claimed_signature: &str,
        body: &[u8],
    ) -> Result<IngestOutcome, GatewayError> {
        // Gate 1: authenticate over the raw bytes.
        let services = self
            .store
            .list_external_services(ListExternalServicesOpts {
                kind: Some(ExternalServiceKind::GitHub),
            })
            .await?;
        let resolver = SecretResolver::new(&services);
        let verified: Vec<_> = resolver
            .candidates(ExternalServiceKind::GitHub)
            .into_iter()
            .filter(|hook| signature::verify(body, claimed_signature, hook.secret.as_bytes()))
            .collect();
        if verified.is_empty() {
            tracing::warn!(event_type, "webhook delivery failed signature verification");
            return Err(GatewayError::Unauthorized);
        }

        // Gate 2: translate.
        let event = match translate(event_type, body)? {
            Translated::Event(event) => event,
            Translated::Unrecognized => {
                tracing::debug!(event_type, "unrecognized webhook event, acknowledging");
                return Ok(IngestOutcome::Skipped(SkipReason::UnrecognizedEvent));
            }
        };

        // Gate 3: the verifying secret must also cover the repository
        // the payload claims to be about.
        if !verified
            .iter()
            .any(|hook| hook.matches_repo(&event.repo_full_name))
        {
            tracing::warn!(
                event_type,
                repo = %event.repo_full_name,
                "verified secret does not cover the delivery's repository"
            );
            return Err(GatewayError::Unauthorized);
        }

        // Gate 4: match the changeset. An unknown changeset is a no-op,
        // not an error: the host cannot retract a delivery.
        let Some(changeset) = self
            .store
            .get_changeset(&event.repo_full_name, &event.external_changeset_id)
            .await?
        else {
            tracing::debug!(
                repo = %event.repo_full_name,
                external_id = %event.external_changeset_id,
                "delivery references unknown changeset, acknowledging"
            );
            return Ok(IngestOutcome::Skipped(SkipReason::UnknownChangeset));
        };

        // Gate 5: idempotent persistence.
        let now = self.clock.now();
        let record = ChangesetEvent {
            id: 0,
            changeset_id: changeset.id,
            kind: event.kind,
            source_id: event.source_id,
            timestamp: event.timestamp,
            metadata: event.metadata,
            created_at: now,
            updated_at: now,
        };
        self.store
            .upsert_changeset_events(std::slice::from_ref(&record))
            .await?;

        tracing::info!(
            changeset_id = %changeset.id,
            kind = %record.kind,
            source_id = %record.source_id,
            "changeset event ingested"
        );
        Ok(IngestOutcome::Persisted {
            changeset_id: changeset.id,
            kind: record.kind,
        })
    }
}
