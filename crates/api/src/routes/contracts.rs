//! Route definitions for the `/contracts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::contracts;
use crate::state::AppState;

/// Routes mounted at `/contracts`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete (draft only)
/// POST   /{id}/activate    -> activate
/// POST   /{id}/terminate   -> terminate
/// POST   /{id}/expire      -> expire
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(contracts::list).post(contracts::create))
        .route(
            "/{id}",
            get(contracts::get_by_id)
                .put(contracts::update)
                .delete(contracts::delete),
        )
        .route("/{id}/activate", post(contracts::activate))
        .route("/{id}/terminate", post(contracts::terminate))
        .route("/{id}/expire", post(contracts::expire))
}
