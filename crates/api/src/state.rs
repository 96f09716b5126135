use std::sync::Arc;

use piniplm_store::{FileStorage, PartStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Part catalog; the only writer of the JSON snapshot.
    pub store: Arc<PartStore>,
    /// Uploaded model files.
    pub files: Arc<FileStorage>,
    pub config: Arc<ServerConfig>,
}
