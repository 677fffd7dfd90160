//! Route definitions for the `/time-entries` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::time_entries;
use crate::state::AppState;

/// Routes mounted at `/time-entries`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// GET    /summary       -> summary
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// POST   /{id}/stop     -> stop
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(time_entries::list).post(time_entries::create))
        .route("/summary", get(time_entries::summary))
        .route(
            "/{id}",
            get(time_entries::get_by_id)
                .put(time_entries::update)
                .delete(time_entries::delete),
        )
        .route("/{id}/stop", post(time_entries::stop))
}
