use std::path::PathBuf;

use piniplm_core::error::CoreError;

/// Errors from the persistence layer.
///
/// Domain failures pass through unchanged as [`StoreError::Domain`] so the
/// HTTP layer can still tell "not found" from "disk full".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// The durable write failed. In-memory state was not changed.
    #[error("Failed to persist snapshot to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
