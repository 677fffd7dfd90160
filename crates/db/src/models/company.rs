//! Company (tenant) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::types::{DbId, Timestamp};
use ledgerline_core::validation::{currency_code, not_blank};

/// A row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: DbId,
    pub name: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub currency: String,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a company during registration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCompany {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = 200))]
    pub legal_name: Option<String>,
    #[validate(length(max = 64))]
    pub tax_id: Option<String>,
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    /// Defaults to `USD` when omitted.
    #[validate(custom(function = "currency_code"))]
    pub currency: Option<String>,
}

/// DTO for updating the caller's company. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCompany {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub legal_name: Option<String>,
    #[validate(length(max = 64))]
    pub tax_id: Option<String>,
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(custom(function = "currency_code"))]
    pub currency: Option<String>,
}
