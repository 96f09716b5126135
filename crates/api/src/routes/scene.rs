//! Route definitions for the flattened scene.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::scene;
use crate::state::AppState;

/// Scene routes mounted at `/scene`.
///
/// ```text
/// GET    /                          -> get_scene
/// GET    /{render_key}              -> get_selection
/// PUT    /{render_key}/transform    -> update_selection_transform
/// PUT    /{render_key}/metadata     -> update_selection_metadata
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scene::get_scene))
        .route("/{render_key}", get(scene::get_selection))
        .route(
            "/{render_key}/transform",
            put(scene::update_selection_transform),
        )
        .route(
            "/{render_key}/metadata",
            put(scene::update_selection_metadata),
        )
}
