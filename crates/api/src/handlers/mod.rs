//! Request handlers, one module per resource.
//!
//! Handlers validate the DTO, apply the business rules from
//! `ledgerline_core`, delegate persistence to the matching repository in
//! `ledgerline_db` and wrap the result in [`ApiResponse`](crate::response::ApiResponse).
//! Every query is scoped by the caller's company.

pub mod accounts;
pub mod auth;
pub mod company;
pub mod contracts;
pub mod employees;
pub mod payroll;
pub mod purchase_orders;
pub mod roles;
pub mod tasks;
pub mod time_entries;
pub mod transactions;
pub mod users;

use ledgerline_core::types::DbId;
use ledgerline_db::models::account::Account;
use ledgerline_db::models::employee::Employee;
use ledgerline_db::repositories::{AccountRepo, EmployeeRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A conditional write matched no row although the record was just read in a
/// state that allowed it.
pub(crate) fn changed_concurrently(entity: &str) -> AppError {
    AppError::conflict(format!(
        "{entity} was modified by another request; reload and try again"
    ))
}

/// Resolve an employee id supplied in a request body.
///
/// An employee of another company is reported as a validation error on
/// `field`, the same as a missing one.
pub(crate) async fn require_employee(
    state: &AppState,
    company_id: DbId,
    employee_id: DbId,
    field: &str,
) -> AppResult<Employee> {
    EmployeeRepo::find_by_id(&state.pool, company_id, employee_id)
        .await?
        .ok_or_else(|| AppError::validation(format!("{field}: employee {employee_id} not found")))
}

/// Resolve an account id supplied in a request body. Inactive accounts are
/// rejected.
pub(crate) async fn require_active_account(
    state: &AppState,
    company_id: DbId,
    account_id: DbId,
) -> AppResult<Account> {
    let account = AccountRepo::find_by_id(&state.pool, company_id, account_id)
        .await?
        .ok_or_else(|| AppError::validation(format!("account_id: account {account_id} not found")))?;
    if !account.is_active {
        return Err(AppError::business_rule(format!(
            "Account '{}' is inactive",
            account.name
        )));
    }
    Ok(account)
}
