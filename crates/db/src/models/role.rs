//! Role entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::permissions::RolePermissions;
use ledgerline_core::types::{DbId, Timestamp};
use ledgerline_core::validation::not_blank;

/// A row from the `roles` table.
///
/// `company_id` is `None` for the seeded system roles.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub company_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    /// Raw JSONB permissions document. Parse with [`Role::permission_document`].
    pub permissions: serde_json::Value,
    pub is_system: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Role {
    /// Parse the stored document. A malformed document yields `None`, which
    /// the permission evaluator treats as "no permission data".
    pub fn permission_document(&self) -> Option<RolePermissions> {
        RolePermissions::from_json(&self.permissions).ok()
    }
}

/// DTO for creating a company-scoped custom role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRole {
    #[validate(length(min = 1, max = 64), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: RolePermissions,
}

/// DTO for updating a custom role. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRole {
    #[validate(length(min = 1, max = 64), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub permissions: Option<RolePermissions>,
}
