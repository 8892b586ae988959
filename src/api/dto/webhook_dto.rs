//! DTOs for the webhook receiver.

use serde::Serialize;
use utoipa::ToSchema;

use crate::service::{IngestOutcome, SkipReason};

/// Acknowledgement body returned for accepted deliveries.
///
/// The status code is the contract; this body exists for operators
/// reading delivery logs on the host side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookAckDto {
    /// `"persisted"` or `"skipped"`.
    pub status: &'static str,
    /// Why the delivery was skipped, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl From<IngestOutcome> for WebhookAckDto {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Persisted { .. } => Self {
                status: "persisted",
                reason: None,
            },
            IngestOutcome::Skipped(SkipReason::UnrecognizedEvent) => Self {
                status: "skipped",
                reason: Some("unrecognized_event"),
            },
            IngestOutcome::Skipped(SkipReason::UnknownChangeset) => Self {
                status: "skipped",
                reason: Some("unknown_changeset"),
            },
        }
    }
}
