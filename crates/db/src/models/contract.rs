//! Contract entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::lifecycle::ContractStatus;
use ledgerline_core::types::{Date, DbId, Money, Timestamp};
use ledgerline_core::validation::{non_negative_amount, not_blank};

/// A row from the `contracts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contract {
    pub id: DbId,
    pub company_id: DbId,
    pub employee_id: Option<DbId>,
    pub title: String,
    pub counterparty: String,
    pub contract_type: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub value: Option<Money>,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: ContractStatus,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a contract. New contracts start as `draft`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContract {
    pub employee_id: Option<DbId>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub counterparty: String,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub contract_type: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    #[validate(custom(function = "non_negative_amount"))]
    pub value: Option<Money>,
    pub notes: Option<String>,
}

/// DTO for updating a contract. Status moves through the action endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContract {
    pub employee_id: Option<DbId>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub counterparty: Option<String>,
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub contract_type: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[validate(custom(function = "non_negative_amount"))]
    pub value: Option<Money>,
    pub notes: Option<String>,
}

/// Body of `POST /contracts/{id}/terminate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TerminateContract {
    /// Defaults to today. Recorded as the contract's end date.
    pub end_date: Option<Date>,
}

/// Query filters for listing contracts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractFilter {
    pub status: Option<ContractStatus>,
    pub employee_id: Option<DbId>,
}
