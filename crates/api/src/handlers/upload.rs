//! Handler for uploading 3D model files.
//!
//! Each accepted upload creates exactly one part with blank metadata,
//! named after the uploaded file.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use piniplm_core::error::CoreError;
use piniplm_core::part::{FileRef, NewPart, PartView};
use piniplm_core::types::PartId;
use piniplm_core::upload::{model_extension, part_name_from_file};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: PartId,
    pub file: FileRef,
    pub metadata: PartView,
}

/// POST /api/v1/upload
///
/// Accepts a multipart form with a `file` field. Allowed extensions:
/// `.jt`, `.obj`, `.stl`, `.gltf`, `.glb`.
pub async fn upload_part(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadResponse>>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue; // ignore unknown fields
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        // Fail before buffering the body if the type is not allowed.
        model_extension(&original_name)?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((original_name, data.to_vec()));
    }

    let (original_name, data) = upload.ok_or_else(|| {
        CoreError::Validation("Missing required 'file' field".into())
    })?;

    let file = state.files.save(&original_name, &data).await?;

    let input = NewPart {
        name: part_name_from_file(&original_name),
        file: Some(file.clone()),
    };
    let part = match state.store.create_part(input).await {
        Ok(part) => part,
        Err(err) => {
            if let Err(cleanup) = state.files.remove(&file.filename).await {
                tracing::warn!(filename = %file.filename, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(err.into());
        }
    };

    tracing::info!(part_id = %part.id, filename = %file.filename, size = file.size, "Part uploaded");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResponse {
                id: part.id,
                file,
                metadata: PartView {
                    part,
                    children: Vec::new(),
                },
            },
        }),
    ))
}
