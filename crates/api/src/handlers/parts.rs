//! Handlers for part records: listing, metadata edits, default transforms
//! and deletion.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use piniplm_core::part::UpdatePart;
use piniplm_core::types::{PartId, TransformPatch};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/parts
///
/// All parts in upload order, children expanded.
pub async fn list_parts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let parts = state.store.list_parts().await;
    Ok(Json(DataResponse { data: parts }))
}

/// GET /api/v1/parts/{id}
pub async fn get_part(
    State(state): State<AppState>,
    AppPath(id): AppPath<PartId>,
) -> AppResult<impl IntoResponse> {
    let part = state.store.get_part(id).await?;
    Ok(Json(DataResponse { data: part }))
}

/// GET /api/v1/metadata
///
/// All parts keyed by ID.
pub async fn metadata_map(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let map = state.store.metadata_map().await;
    Ok(Json(DataResponse { data: map }))
}

/// PUT /api/v1/parts/{id}
///
/// Partial metadata update. Relationship fields in the payload are ignored.
pub async fn update_part(
    State(state): State<AppState>,
    AppPath(id): AppPath<PartId>,
    AppJson(input): AppJson<UpdatePart>,
) -> AppResult<impl IntoResponse> {
    let part = state.store.update_part(id, input).await?;

    tracing::info!(part_id = %id, "Part metadata updated");

    Ok(Json(DataResponse { data: part }))
}

/// PUT /api/v1/parts/{id}/transform
///
/// Update the part's own default transform (used when it renders as a root).
pub async fn update_transform(
    State(state): State<AppState>,
    AppPath(id): AppPath<PartId>,
    AppJson(patch): AppJson<TransformPatch>,
) -> AppResult<impl IntoResponse> {
    let part = state.store.update_part_transform(id, patch).await?;

    tracing::info!(part_id = %id, "Part transform updated");

    Ok(Json(DataResponse { data: part }))
}

/// DELETE /api/v1/parts/{id}
///
/// Delete a part, every instance placing it, and its stored file.
pub async fn delete_part(
    State(state): State<AppState>,
    AppPath(id): AppPath<PartId>,
) -> AppResult<StatusCode> {
    let part = state.store.delete_part(id).await?;

    if let Some(file) = &part.file {
        if let Err(err) = state.files.remove(&file.filename).await {
            tracing::warn!(part_id = %id, filename = %file.filename, error = %err, "Failed to delete stored file");
        }
    }

    tracing::info!(part_id = %id, "Part deleted");

    Ok(StatusCode::NO_CONTENT)
}
