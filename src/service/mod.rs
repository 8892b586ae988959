//! Service layer: ingestion and reporting orchestration.

pub mod counts_service;
pub mod webhook_service;

pub use counts_service::CountsService;
pub use webhook_service::{IngestOutcome, SkipReason, WebhookService};
