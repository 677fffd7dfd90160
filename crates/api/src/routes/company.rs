//! Route definitions for the `/companies` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::company;
use crate::state::AppState;

/// Routes mounted at `/companies`.
///
/// ```text
/// GET /current  -> get_current
/// PUT /current  -> update_current
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/current",
        get(company::get_current).put(company::update_current),
    )
}
