//! Repository for the `roles` table.
//!
//! A company sees the system roles plus its own custom roles. Custom roles
//! of other companies are invisible.

use sqlx::PgPool;
use ledgerline_core::types::DbId;

use crate::models::role::{CreateRole, Role, UpdateRole};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, name, description, permissions, is_system, \
                       created_by, updated_by, created_at, updated_at";

/// Visibility predicate; expects the company id as `$1`.
const VISIBLE: &str = "(company_id IS NULL OR company_id = $1)";

/// Provides CRUD operations for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// List system roles followed by the company's custom roles.
    pub async fn list_visible(pool: &PgPool, company_id: DbId) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM roles WHERE {VISIBLE}
             ORDER BY is_system DESC, name ASC"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }

    /// Find a role visible to the company.
    pub async fn find_visible(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE {VISIBLE} AND id = $2");
        sqlx::query_as::<_, Role>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a company-scoped custom role.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateRole,
        actor: DbId,
    ) -> Result<Role, sqlx::Error> {
        let query = format!(
            "INSERT INTO roles (company_id, name, description, permissions, is_system, created_by, updated_by)
             VALUES ($1, $2, $3, $4, false, $5, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(company_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.permissions.to_json())
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Update a custom role owned by the company. System roles never match.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateRole,
        actor: DbId,
    ) -> Result<Option<Role>, sqlx::Error> {
        let query = format!(
            "UPDATE roles SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                permissions = COALESCE($5, permissions),
                updated_by = $6
             WHERE company_id = $1 AND id = $2 AND is_system = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(company_id)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.permissions.as_ref().map(|p| p.to_json()))
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Delete a custom role owned by the company. Returns `true` if removed.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM roles WHERE company_id = $1 AND id = $2 AND is_system = false")
                .bind(company_id)
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of users currently assigned to the role.
    pub async fn count_users(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Overwrite the permission document of a system role by name.
    ///
    /// Returns `true` if the role exists.
    pub async fn sync_system_permissions(
        pool: &PgPool,
        name: &str,
        permissions: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE roles SET permissions = $2
             WHERE company_id IS NULL AND name = $1 AND permissions IS DISTINCT FROM $2",
        )
        .bind(name)
        .bind(permissions)
        .execute(pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM roles WHERE company_id IS NULL AND name = $1)",
        )
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
