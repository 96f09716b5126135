//! Storage of uploaded model files under a single directory.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use piniplm_core::error::CoreError;
use piniplm_core::part::FileRef;
use piniplm_core::upload::{model_extension, stored_file_name};

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Use `root` as the uploads directory, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate and store an upload under a freshly generated name.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<FileRef, StoreError> {
        let ext = model_extension(original_name)?;
        if bytes.is_empty() {
            return Err(CoreError::Validation("Uploaded file is empty".into()).into());
        }

        let filename = stored_file_name(&ext);
        tokio::fs::write(self.root.join(&filename), bytes).await?;
        tracing::debug!(%filename, size = bytes.len(), "Stored upload");

        Ok(FileRef {
            original_name: original_name.to_string(),
            filename,
            size: bytes.len() as u64,
            uploaded_at: Utc::now(),
        })
    }

    /// Remove a stored file. Returns `false` if it was already gone.
    pub async fn remove(&self, filename: &str) -> Result<bool, StoreError> {
        let path = self.path_of(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Absolute path of a stored file. Rejects anything that is not a bare
    /// file name.
    pub fn path_of(&self, filename: &str) -> Result<PathBuf, StoreError> {
        let bare = Path::new(filename).file_name().and_then(|n| n.to_str());
        if bare != Some(filename) {
            return Err(CoreError::Validation(format!("Invalid stored file name '{filename}'")).into());
        }
        Ok(self.root.join(filename))
    }
}
