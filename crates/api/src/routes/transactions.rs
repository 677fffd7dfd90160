//! Route definitions for the `/transactions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::transactions;
use crate::state::AppState;

/// Routes mounted at `/transactions`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// GET    /summary       -> summary
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update (pending only)
/// DELETE /{id}          -> delete (pending only)
/// POST   /{id}/pay      -> pay
/// POST   /{id}/cancel   -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(transactions::list).post(transactions::create))
        .route("/summary", get(transactions::summary))
        .route(
            "/{id}",
            get(transactions::get_by_id)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/{id}/pay", post(transactions::pay))
        .route("/{id}/cancel", post(transactions::cancel))
}
