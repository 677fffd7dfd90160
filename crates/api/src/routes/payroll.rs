//! Route definitions for the `/payrolls` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payroll;
use crate::state::AppState;

/// Routes mounted at `/payrolls`.
///
/// ```text
/// GET    /               -> list
/// POST   /               -> create
/// POST   /generate       -> generate
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update (draft only)
/// DELETE /{id}           -> delete (draft only)
/// POST   /{id}/approve   -> approve
/// POST   /{id}/pay       -> pay
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(payroll::list).post(payroll::create))
        .route("/generate", post(payroll::generate))
        .route(
            "/{id}",
            get(payroll::get_by_id)
                .put(payroll::update)
                .delete(payroll::delete),
        )
        .route("/{id}/approve", post(payroll::approve))
        .route("/{id}/pay", post(payroll::pay))
}
