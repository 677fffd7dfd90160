//! Ledgerline API server library.
//!
//! Exposes the building blocks (config, state, error handling, auth, the
//! permission filter, routes) so integration tests and the binary entrypoint
//! share the exact same router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
