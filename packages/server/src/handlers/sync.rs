use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{SyncFailure, SyncFailureBody};
use crate::extractors::auth::SyncCaller;
use crate::models::sync::SyncResponse;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/sync",
    tag = "Sync",
    operation_id = "triggerSync",
    summary = "Sync plants and photos from the plant API",
    description = "Runs one full sync pass: fetches every remote plant, creates missing plants, and stores any photo not seen before. Per-plant failures are reported in `errors` and do not fail the request. Requires the sync API key as a bearer token.",
    responses(
        (status = 200, description = "Sync finished", body = SyncResponse),
        (status = 401, description = "Missing or wrong API key", body = SyncFailureBody),
        (status = 409, description = "Another sync is already running", body = SyncFailureBody),
        (status = 500, description = "Fatal sync error (token, pagination or database)", body = SyncFailureBody),
    ),
    security(("sync_api_key" = [])),
)]
#[instrument(skip(_caller, state))]
pub async fn trigger_sync(
    _caller: SyncCaller,
    State(state): State<AppState>,
) -> Result<Json<SyncResponse>, SyncFailure> {
    let report = state.sync.run().await?;
    Ok(Json(SyncResponse::from(report)))
}
