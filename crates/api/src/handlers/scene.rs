//! Handlers for the flattened scene and selection-based edits.
//!
//! A render key is either a part ID (root) or an instance ID (child
//! placement). Edits addressed by render key are routed to whichever record
//! owns the data.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use piniplm_core::part::UpdatePart;
use piniplm_core::selection::Selection;
use piniplm_core::types::{Transform, TransformPatch};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SelectionTransform {
    pub selection: Selection,
    pub transform: Transform,
}

/// GET /api/v1/scene
///
/// Flattened render instances, recomputed from the current catalog.
pub async fn get_scene(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let scene = state.store.scene().await?;
    Ok(Json(DataResponse { data: scene }))
}

/// GET /api/v1/scene/{render_key}
pub async fn get_selection(
    State(state): State<AppState>,
    AppPath(render_key): AppPath<String>,
) -> AppResult<impl IntoResponse> {
    let selection = state.store.resolve(&render_key).await?;
    Ok(Json(DataResponse { data: selection }))
}

/// PUT /api/v1/scene/{render_key}/transform
///
/// Roots update the part's default transform; child placements update the
/// instance relation.
pub async fn update_selection_transform(
    State(state): State<AppState>,
    AppPath(render_key): AppPath<String>,
    AppJson(patch): AppJson<TransformPatch>,
) -> AppResult<impl IntoResponse> {
    let (selection, transform) = state
        .store
        .apply_selection_transform(&render_key, patch)
        .await?;

    tracing::info!(%render_key, ?selection, "Selection transform updated");

    Ok(Json(DataResponse {
        data: SelectionTransform {
            selection,
            transform,
        },
    }))
}

/// PUT /api/v1/scene/{render_key}/metadata
///
/// Always edits the underlying part, shared by all of its instances.
pub async fn update_selection_metadata(
    State(state): State<AppState>,
    AppPath(render_key): AppPath<String>,
    AppJson(input): AppJson<UpdatePart>,
) -> AppResult<impl IntoResponse> {
    let part = state
        .store
        .update_selection_metadata(&render_key, input)
        .await?;

    tracing::info!(%render_key, part_id = %part.part.id, "Selection metadata updated");

    Ok(Json(DataResponse { data: part }))
}
