//! Handlers for parent/child relations between parts.
//!
//! Child placements are nested under their parent:
//! `/parts/{id}/children[/{instance_id}[/relation]]`

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use piniplm_core::types::{InstanceId, PartId, TransformPatch, Vec3};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for attaching a child.
#[derive(Debug, Deserialize)]
pub struct AttachChildRequest {
    pub child_id: PartId,
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
}

/// Body for replacing the part in an existing slot.
#[derive(Debug, Deserialize)]
pub struct ReplaceChildRequest {
    pub new_child_id: PartId,
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
}

/// POST /api/v1/parts/{id}/children
pub async fn attach_child(
    State(state): State<AppState>,
    AppPath(parent_id): AppPath<PartId>,
    AppJson(input): AppJson<AttachChildRequest>,
) -> AppResult<impl IntoResponse> {
    let instance = state
        .store
        .attach_child(parent_id, input.child_id, input.position, input.rotation)
        .await?;

    tracing::info!(
        %parent_id,
        child_id = %input.child_id,
        instance_id = %instance.id,
        "Child attached",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: instance })))
}

/// DELETE /api/v1/parts/{id}/children/{instance_id}
pub async fn detach_child(
    State(state): State<AppState>,
    AppPath((parent_id, instance_id)): AppPath<(PartId, InstanceId)>,
) -> AppResult<StatusCode> {
    state.store.detach_child(parent_id, instance_id).await?;

    tracing::info!(%parent_id, %instance_id, "Child detached");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/parts/{id}/children/{instance_id}
///
/// Swap the referenced part while keeping the instance ID. Omitted
/// transform fields keep their previous values.
pub async fn replace_child(
    State(state): State<AppState>,
    AppPath((parent_id, instance_id)): AppPath<(PartId, InstanceId)>,
    AppJson(input): AppJson<ReplaceChildRequest>,
) -> AppResult<impl IntoResponse> {
    let patch = TransformPatch {
        position: input.position,
        rotation: input.rotation,
    };
    let instance = state
        .store
        .replace_child(parent_id, instance_id, input.new_child_id, patch)
        .await?;

    tracing::info!(
        %parent_id,
        %instance_id,
        new_child_id = %input.new_child_id,
        "Child replaced",
    );

    Ok(Json(DataResponse { data: instance }))
}

/// PUT /api/v1/parts/{id}/children/{instance_id}/relation
pub async fn update_relation(
    State(state): State<AppState>,
    AppPath((parent_id, instance_id)): AppPath<(PartId, InstanceId)>,
    AppJson(patch): AppJson<TransformPatch>,
) -> AppResult<impl IntoResponse> {
    let instance = state
        .store
        .update_relation(parent_id, instance_id, patch)
        .await?;

    tracing::info!(%parent_id, %instance_id, "Child relation updated");

    Ok(Json(DataResponse { data: instance }))
}
