//! Domain layer: changesets, events, external services, and counts.
//!
//! This module contains the server-side domain model: the tracked
//! changeset and its immutable event log, the configured external
//! services carrying webhook secrets, the injected time source, and the
//! pure historical counts reconstruction.

pub mod changeset;
pub mod clock;
pub mod counts;
pub mod event;
pub mod external_service;

pub use changeset::{Changeset, ChangesetId};
pub use clock::Clock;
pub use counts::{ChangesetCounts, calc_counts};
pub use event::{ChangesetEvent, ChangesetEventKind, ReviewState};
pub use external_service::{ExternalService, ExternalServiceKind, SecretResolver, WebhookEntry};
