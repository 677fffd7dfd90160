//! Financial account entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::types::{DbId, Money, Timestamp};
use ledgerline_core::validation::{currency_code, not_blank};

/// A row from the `accounts` table.
///
/// `balance` only changes when a transaction is paid.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: DbId,
    pub company_id: DbId,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    pub balance: Money,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an account. The balance starts at zero.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccount {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: String,
    /// Free-form classification such as `bank`, `cash` or `credit_card`.
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub account_type: String,
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
}

/// DTO for updating an account. Currency and balance are fixed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAccount {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub account_type: Option<String>,
    pub is_active: Option<bool>,
}
