//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ledgerline_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub company_id: DbId,
    pub role_id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// User joined with its role name, safe for API responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub company_id: DbId,
    pub username: String,
    pub email: String,
    pub role_id: DbId,
    /// Resolved role name (e.g. `"admin"`, `"accountant"`).
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a new user. The password is already hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub company_id: DbId,
    pub role_id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct UpdateUser {
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// Query filters for listing users.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
    /// Case-insensitive match on username or email.
    pub search: Option<String>,
}
