//! Upload validation for 3D model files.

use std::path::Path;

use uuid::Uuid;

use crate::error::CoreError;

/// Model formats accepted by the upload endpoint (lowercase, no dot).
pub const ALLOWED_MODEL_EXTENSIONS: &[&str] = &["jt", "obj", "stl", "gltf", "glb"];

/// Validate an uploaded file name and return its lowercase extension.
pub fn model_extension(file_name: &str) -> Result<String, CoreError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_MODEL_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported model format '{file_name}'. Supported: {}",
            ALLOWED_MODEL_EXTENSIONS
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Default part name for an upload: the file stem without any directory.
pub fn part_name_from_file(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("part")
        .to_string()
}

/// Unique on-disk name for a stored upload.
pub fn stored_file_name(extension: &str) -> String {
    format!("{}.{extension}", Uuid::new_v4())
}
