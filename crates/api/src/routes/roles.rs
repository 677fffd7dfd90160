//! Route definitions for the `/roles` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::roles;
use crate::state::AppState;

/// Routes mounted at `/roles`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /modules   -> modules
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(roles::list).post(roles::create))
        .route("/modules", get(roles::modules))
        .route(
            "/{id}",
            get(roles::get_by_id)
                .put(roles::update)
                .delete(roles::delete),
        )
}
