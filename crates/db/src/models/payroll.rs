//! Payroll entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::lifecycle::PayrollStatus;
use ledgerline_core::payroll::PayrollAmounts;
use ledgerline_core::types::{Date, DbId, Money, Timestamp};
use ledgerline_core::validation::non_negative_amount;

/// A row from the `payrolls` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payroll {
    pub id: DbId,
    pub company_id: DbId,
    pub employee_id: DbId,
    pub period_start: Date,
    pub period_end: Date,
    pub base_salary: Money,
    pub bonus: Money,
    pub deductions: Money,
    pub gross_pay: Money,
    pub net_pay: Money,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: PayrollStatus,
    pub notes: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub approved_by: Option<DbId>,
    pub paid_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a single draft payroll record.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePayroll {
    pub employee_id: DbId,
    pub period_start: Date,
    pub period_end: Date,
    /// Defaults to the employee's current base salary.
    #[validate(custom(function = "non_negative_amount"))]
    pub base_salary: Option<Money>,
    #[validate(custom(function = "non_negative_amount"))]
    pub bonus: Option<Money>,
    #[validate(custom(function = "non_negative_amount"))]
    pub deductions: Option<Money>,
    pub notes: Option<String>,
}

/// DTO for editing a draft payroll. Amounts are recomputed on save.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePayroll {
    #[validate(custom(function = "non_negative_amount"))]
    pub base_salary: Option<Money>,
    #[validate(custom(function = "non_negative_amount"))]
    pub bonus: Option<Money>,
    #[validate(custom(function = "non_negative_amount"))]
    pub deductions: Option<Money>,
    pub notes: Option<String>,
}

/// Insert payload once amounts are computed.
#[derive(Debug, Clone)]
pub struct NewPayroll {
    pub employee_id: DbId,
    pub period_start: Date,
    pub period_end: Date,
    pub amounts: PayrollAmounts,
    pub notes: Option<String>,
}

/// Body of `POST /payrolls/generate`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GeneratePayroll {
    pub period_start: Date,
    pub period_end: Date,
}

/// Result of a generate run.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPayrolls {
    pub created: Vec<Payroll>,
    /// Active employees that already had a record for the period.
    pub skipped: i64,
}

/// Body of `POST /payrolls/{id}/pay`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PayPayroll {
    pub account_id: DbId,
}

/// Query filters for listing payroll records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollFilter {
    pub status: Option<PayrollStatus>,
    pub employee_id: Option<DbId>,
    /// Records whose period starts on or after this date.
    pub from: Option<Date>,
    /// Records whose period ends on or before this date.
    pub to: Option<Date>,
}
