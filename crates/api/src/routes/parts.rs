//! Route definitions for parts and their child relations.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{assembly, parts};
use crate::state::AppState;

/// Part routes mounted at `/parts`.
///
/// ```text
/// GET    /                                    -> list_parts
/// GET    /{id}                                -> get_part
/// PUT    /{id}                                -> update_part
/// DELETE /{id}                                -> delete_part
/// PUT    /{id}/transform                      -> update_transform
/// POST   /{id}/children                       -> attach_child
/// PUT    /{id}/children/{instance_id}         -> replace_child
/// DELETE /{id}/children/{instance_id}         -> detach_child
/// PUT    /{id}/children/{instance_id}/relation -> update_relation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(parts::list_parts))
        .route(
            "/{id}",
            get(parts::get_part)
                .put(parts::update_part)
                .delete(parts::delete_part),
        )
        .route("/{id}/transform", put(parts::update_transform))
        .route("/{id}/children", post(assembly::attach_child))
        .route(
            "/{id}/children/{instance_id}",
            put(assembly::replace_child).delete(assembly::detach_child),
        )
        .route(
            "/{id}/children/{instance_id}/relation",
            put(assembly::update_relation),
        )
}
