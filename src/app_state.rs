//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{CountsService, WebhookService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Webhook ingestion orchestration.
    pub webhook_service: Arc<WebhookService>,
    /// Historical counts reconstruction.
    pub counts_service: Arc<CountsService>,
}
