pub mod health;
pub mod parts;
pub mod scene;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /upload                                          upload model file (POST)
///
/// /parts                                           list
/// /parts/{id}                                      get, update metadata, delete
/// /parts/{id}/transform                            update default transform (PUT)
/// /parts/{id}/children                             attach child (POST)
/// /parts/{id}/children/{instance_id}               replace (PUT), detach (DELETE)
/// /parts/{id}/children/{instance_id}/relation      update position/rotation (PUT)
///
/// /metadata                                        all parts keyed by id
///
/// /scene                                           flattened render instances
/// /scene/{render_key}                              resolve selection
/// /scene/{render_key}/transform                    routed transform edit (PUT)
/// /scene/{render_key}/metadata                     edit underlying part (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(handlers::upload::upload_part))
        .route("/metadata", get(handlers::parts::metadata_map))
        .nest("/parts", parts::router())
        .nest("/scene", scene::router())
}
