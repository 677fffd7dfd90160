//! Route definitions for the `/purchase-orders` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::purchase_orders;
use crate::state::AppState;

/// Routes mounted at `/purchase-orders`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// GET    /{id}           -> get_by_id (with lines)
/// PUT    /{id}           -> update (draft only)
/// DELETE /{id}           -> delete (draft or cancelled)
/// POST   /{id}/submit    -> submit
/// POST   /{id}/approve   -> approve
/// POST   /{id}/receive   -> receive
/// POST   /{id}/cancel    -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(purchase_orders::list).post(purchase_orders::create),
        )
        .route(
            "/{id}",
            get(purchase_orders::get_by_id)
                .put(purchase_orders::update)
                .delete(purchase_orders::delete),
        )
        .route("/{id}/submit", post(purchase_orders::submit))
        .route("/{id}/approve", post(purchase_orders::approve))
        .route("/{id}/receive", post(purchase_orders::receive))
        .route("/{id}/cancel", post(purchase_orders::cancel))
}
