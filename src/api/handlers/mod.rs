//! REST endpoint handlers organized by resource.

pub mod counts;
pub mod system;
pub mod webhook;

use axum::Router;

use crate::app_state::AppState;

/// Composes the reporting routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(counts::routes())
}
