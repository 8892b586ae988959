//! Counts reporting handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ChangesetCountsDto, CountsWindowParams};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /changesets/counts` — Reconstructed daily changeset counts.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an inverted window and
/// a generic server error when reconstruction fails.
#[utoipa::path(
    get,
    path = "/api/v1/changesets/counts",
    tag = "Changesets",
    summary = "Reconstruct historical changeset counts",
    description = "Replays the stored changeset event log and returns one aggregate snapshot per day over the requested window, oldest first. The window end is always sampled exactly.",
    params(CountsWindowParams),
    responses(
        (status = 200, description = "Daily snapshots, oldest first", body = Vec<ChangesetCountsDto>),
        (status = 400, description = "Inverted window", body = ErrorResponse),
        (status = 500, description = "Reconstruction failed", body = ErrorResponse),
    )
)]
pub async fn get_counts(
    State(state): State<AppState>,
    Query(params): Query<CountsWindowParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let counts = state
        .counts_service
        .counts_over_window(params.from, params.to)
        .await?;

    let body: Vec<ChangesetCountsDto> = counts.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// Changeset reporting routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/changesets/counts", get(get_counts))
}
