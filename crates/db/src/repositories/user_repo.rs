//! Repository for the `users` table.

use sqlx::PgPool;
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, UpdateUser, User, UserFilter, UserResponse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, role_id, username, email, password_hash, is_active, \
                       failed_login_count, locked_until, last_login_at, \
                       created_by, updated_by, created_at, updated_at";

/// Columns of [`UserResponse`], selected from `users u JOIN roles r`.
const RESPONSE_COLUMNS: &str = "u.id, u.company_id, u.username, u.email, u.role_id, \
                                r.name AS role, u.is_active, u.last_login_at, \
                                u.created_at, u.updated_at";

/// List predicate; `$1` company, `$2` role, `$3` active flag, `$4` search.
const FILTER: &str = "u.company_id = $1
    AND ($2::BIGINT IS NULL OR u.role_id = $2)
    AND ($3::BOOLEAN IS NULL OR u.is_active = $3)
    AND ($4::TEXT IS NULL OR u.username ILIKE '%' || $4 || '%' OR u.email ILIKE '%' || $4 || '%')";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        actor: DbId,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (company_id, role_id, username, email, password_hash, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.company_id)
            .bind(input.role_id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID regardless of company. Used by the auth flow.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find the API representation of a user within a company.
    pub async fn find_response(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.company_id = $1 AND u.id = $2"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a company's users, newest first.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<UserResponse>, sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM users u WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.role_id)
            .bind(filter.is_active)
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE {FILTER}
             ORDER BY u.created_at DESC, u.id DESC
             LIMIT $5 OFFSET $6"
        );
        let items = sqlx::query_as::<_, UserResponse>(&query)
            .bind(company_id)
            .bind(filter.role_id)
            .bind(filter.is_active)
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if the user does not exist in the company.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateUser,
        actor: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                email = COALESCE($3, email),
                role_id = COALESCE($4, role_id),
                is_active = COALESCE($5, is_active),
                updated_by = $6
             WHERE company_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(company_id)
            .bind(id)
            .bind(&input.email)
            .bind(input.role_id)
            .bind(input.is_active)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn deactivate(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        actor: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = false, updated_by = $3
             WHERE company_id = $1 AND id = $2 AND is_active = true",
        )
        .bind(company_id)
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment the failed login counter by 1, returning the new count.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE users SET failed_login_count = failed_login_count + 1
             WHERE id = $1
             RETURNING failed_login_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Lock a user account until the specified timestamp.
    ///
    /// The failure counter restarts at 0, so once the lock expires the user
    /// again gets the full number of attempts.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2, failed_login_count = 0 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace a user's password hash and clear any lockout.
    ///
    /// Returns `true` if the user exists in the company.
    pub async fn update_password(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        password_hash: &str,
        actor: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                password_hash = $3,
                failed_login_count = 0,
                locked_until = NULL,
                updated_by = $4
             WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(id)
        .bind(password_hash)
        .bind(actor)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
