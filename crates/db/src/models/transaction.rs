//! Accounts payable / receivable transaction model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::lifecycle::{TransactionKind, TransactionStatus};
use ledgerline_core::types::{Date, DbId, Money, Timestamp};
use ledgerline_core::validation::{not_blank, positive_amount};

/// A row from the `financial_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FinancialTransaction {
    pub id: DbId,
    pub company_id: DbId,
    #[sqlx(rename = "kind_id", try_from = "i16")]
    pub kind: TransactionKind,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: TransactionStatus,
    pub account_id: Option<DbId>,
    pub counterparty: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub amount: Money,
    pub due_date: Option<Date>,
    pub paid_at: Option<Timestamp>,
    pub purchase_order_id: Option<DbId>,
    pub payroll_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a payable or receivable. Starts as `pending`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTransaction {
    pub kind: TransactionKind,
    pub account_id: Option<DbId>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub counterparty: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Money,
    pub due_date: Option<Date>,
}

/// DTO for editing a pending transaction. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTransaction {
    pub account_id: Option<DbId>,
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub counterparty: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Money>,
    pub due_date: Option<Date>,
}

/// Body of `POST /transactions/{id}/pay`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayTransaction {
    /// Settle against this account instead of the one on the transaction.
    pub account_id: Option<DbId>,
}

/// Query filters for listing transactions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub account_id: Option<DbId>,
    /// Only pending transactions whose due date has passed.
    pub overdue: Option<bool>,
}

/// Outstanding totals returned by `GET /transactions/summary`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionSummary {
    pub outstanding_payable: Money,
    pub outstanding_receivable: Money,
    pub overdue_count: i64,
    pub overdue_amount: Money,
}
