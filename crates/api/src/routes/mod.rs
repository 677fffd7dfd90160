pub mod accounts;
pub mod auth;
pub mod company;
pub mod contracts;
pub mod employees;
pub mod health;
pub mod payroll;
pub mod purchase_orders;
pub mod roles;
pub mod tasks;
pub mod time_entries;
pub mod transactions;
pub mod users;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;

use crate::middleware::permission;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /info                                   service descriptor (public)
///
/// /auth/register                          create company + admin (public)
/// /auth/login                             login (public)
/// /auth/refresh                           rotate refresh token (public)
/// /auth/logout                            revoke sessions (auth)
/// /auth/me                                current user + permissions (auth)
///
/// -- everything below passes the permission filter --
///
/// /companies/current                      get, update
/// /users                                  list, create
/// /users/{id}                             get, update, deactivate
/// /users/{id}/reset-password              reset password
/// /roles                                  list, create
/// /roles/modules                          module catalogue
/// /roles/{id}                             get, update, delete
/// /employees                              list, create
/// /employees/export                       CSV export
/// /employees/{id}                         get, update, delete
/// /contracts                              list, create
/// /contracts/{id}                         get, update, delete
/// /contracts/{id}/activate|terminate|expire
/// /accounts                               list, create
/// /accounts/{id}                          get, update, delete
/// /transactions                           list, create
/// /transactions/summary                   outstanding totals
/// /transactions/{id}                      get, update, delete
/// /transactions/{id}/pay|cancel
/// /purchase-orders                        list, create
/// /purchase-orders/{id}                   get, update, delete
/// /purchase-orders/{id}/submit|approve|receive|cancel
/// /payrolls                               list, create
/// /payrolls/generate                      generate drafts for a period
/// /payrolls/{id}                          get, update, delete
/// /payrolls/{id}/approve|pay
/// /tasks                                  list, create
/// /tasks/{id}                             get, update, delete
/// /tasks/{id}/status                      change status
/// /time-entries                           list, create
/// /time-entries/summary                   minute totals
/// /time-entries/{id}                      get, update, delete
/// /time-entries/{id}/stop                 stop a running entry
/// ```
pub fn api_routes(state: AppState) -> Router<AppState> {
    // `route_layer` only wraps matched routes, so unknown paths still 404
    // instead of 401.
    let protected = Router::new()
        .nest("/companies", company::router())
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .nest("/employees", employees::router())
        .nest("/contracts", contracts::router())
        .nest("/accounts", accounts::router())
        .nest("/transactions", transactions::router())
        .nest("/purchase-orders", purchase_orders::router())
        .nest("/payrolls", payroll::router())
        .nest("/tasks", tasks::router())
        .nest("/time-entries", time_entries::router())
        .route_layer(from_fn_with_state(state, permission::enforce));

    Router::new()
        .route("/info", get(health::info))
        .nest("/auth", auth::router())
        .merge(protected)
}
