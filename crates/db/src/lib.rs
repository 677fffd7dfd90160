//! Persistence layer for Ledgerline.
//!
//! - [`models`] -- `FromRow` entity structs and their create/update DTOs.
//! - [`repositories`] -- zero-sized repository structs with async queries.
//!
//! Every tenant-owned query takes the caller's `company_id`; a row belonging
//! to another company is indistinguishable from a missing one.

pub mod models;
pub mod repositories;

use ledgerline_core::permissions::defaults::default_permissions;
use ledgerline_core::roles::SYSTEM_ROLES;
use sqlx::postgres::PgPoolOptions;

use crate::repositories::RoleRepo;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Write the built-in permission documents onto the seeded system roles.
///
/// Runs at startup so a release can change a default document without a new
/// migration. A missing system role is logged and skipped.
pub async fn sync_system_roles(pool: &DbPool) -> Result<(), sqlx::Error> {
    for name in SYSTEM_ROLES {
        let Some(document) = default_permissions(name) else {
            continue;
        };
        if !RoleRepo::sync_system_permissions(pool, name, &document.to_json()).await? {
            tracing::warn!(role = name, "System role missing from database");
        }
    }
    Ok(())
}
