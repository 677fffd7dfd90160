//! Handlers for the `/payrolls` resource: drafts, generation, approval and
//! payment.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use ledgerline_core::lifecycle::{ensure_transition, EmployeeStatus, PayrollStatus};
use ledgerline_core::pagination::Page;
use ledgerline_core::payroll::{validate_period, PayrollAmounts};
use ledgerline_core::types::{DbId, Money};
use ledgerline_db::models::payroll::{
    CreatePayroll, GeneratePayroll, GeneratedPayrolls, NewPayroll, PayPayroll, Payroll,
    PayrollFilter, UpdatePayroll,
};
use ledgerline_db::models::transaction::FinancialTransaction;
use ledgerline_db::repositories::{PayrollPayment, PayrollRepo};
use serde::Serialize;

use super::{changed_concurrently, require_active_account, require_employee};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Response of `POST /payrolls/{id}/pay`.
#[derive(Debug, Serialize)]
pub struct PayrollPaid {
    pub payroll: Payroll,
    /// The paid payable; absent when the net pay was zero.
    pub transaction: Option<FinancialTransaction>,
}

/// GET /api/payrolls
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(filter): Query<PayrollFilter>,
) -> AppResult<ApiResponse<Page<Payroll>>> {
    let payrolls =
        PayrollRepo::list(&state.pool, auth.company_id, &filter, page.to_request()).await?;
    Ok(ApiResponse::ok(payrolls))
}

/// GET /api/payrolls/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Payroll>> {
    let payroll = find(&state, auth.company_id, id).await?;
    Ok(ApiResponse::ok(payroll))
}

/// POST /api/payrolls
///
/// The base salary defaults to the employee's current salary.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreatePayroll>,
) -> AppResult<ApiResponse<Payroll>> {
    validate_period(input.period_start, input.period_end)?;
    let employee = require_employee(&state, auth.company_id, input.employee_id, "employee_id").await?;
    if employee.status == EmployeeStatus::Terminated {
        return Err(AppError::business_rule(format!(
            "Employee {} is terminated",
            employee.full_name()
        )));
    }

    let amounts = PayrollAmounts::compute(
        input.base_salary.unwrap_or(employee.base_salary),
        input.bonus.unwrap_or(Money::ZERO),
        input.deductions.unwrap_or(Money::ZERO),
    )?;
    let new_payroll = NewPayroll {
        employee_id: employee.id,
        period_start: input.period_start,
        period_end: input.period_end,
        amounts,
        notes: input.notes,
    };

    let payroll = PayrollRepo::create(&state.pool, auth.company_id, &new_payroll, auth.user_id).await?;
    tracing::info!(payroll_id = payroll.id, employee_id = employee.id, "Payroll created");
    Ok(ApiResponse::created(payroll))
}

/// POST /api/payrolls/generate
///
/// One draft per active employee without a record for the period.
pub async fn generate(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<GeneratePayroll>,
) -> AppResult<ApiResponse<GeneratedPayrolls>> {
    validate_period(input.period_start, input.period_end)?;

    let generated = PayrollRepo::generate(
        &state.pool,
        auth.company_id,
        input.period_start,
        input.period_end,
        auth.user_id,
    )
    .await?;

    tracing::info!(
        company_id = auth.company_id,
        period_start = %input.period_start,
        period_end = %input.period_end,
        created = generated.created.len(),
        skipped = generated.skipped,
        "Payroll generated"
    );
    Ok(ApiResponse::created(generated))
}

/// PUT /api/payrolls/{id}
///
/// Drafts only; gross and net pay are recomputed from the merged amounts.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdatePayroll>,
) -> AppResult<ApiResponse<Payroll>> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_draft(&existing, "edited")?;

    let amounts = PayrollAmounts::compute(
        input.base_salary.unwrap_or(existing.base_salary),
        input.bonus.unwrap_or(existing.bonus),
        input.deductions.unwrap_or(existing.deductions),
    )?;
    let notes = input.notes.as_deref().or(existing.notes.as_deref());

    let payroll = PayrollRepo::update_draft(
        &state.pool,
        auth.company_id,
        id,
        &amounts,
        notes,
        auth.user_id,
    )
    .await?
    .ok_or_else(|| changed_concurrently("Payroll"))?;
    Ok(ApiResponse::ok(payroll))
}

/// POST /api/payrolls/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Payroll>> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_transition(existing.status, PayrollStatus::Approved)?;

    let payroll = PayrollRepo::approve(&state.pool, auth.company_id, id, auth.user_id)
        .await?
        .ok_or_else(|| changed_concurrently("Payroll"))?;
    tracing::info!(payroll_id = id, approved_by = auth.user_id, "Payroll approved");
    Ok(ApiResponse::ok(payroll))
}

/// POST /api/payrolls/{id}/pay
///
/// Records a paid payable for the net pay and debits the account.
pub async fn pay(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<PayPayroll>,
) -> AppResult<ApiResponse<PayrollPaid>> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_transition(existing.status, PayrollStatus::Paid)?;
    require_active_account(&state, auth.company_id, input.account_id).await?;
    let employee =
        require_employee(&state, auth.company_id, existing.employee_id, "employee_id").await?;

    let outcome = PayrollRepo::pay(
        &state.pool,
        auth.company_id,
        id,
        input.account_id,
        &employee.full_name(),
        auth.user_id,
    )
    .await?;

    match outcome {
        PayrollPayment::Paid {
            payroll,
            transaction,
        } => {
            tracing::info!(
                payroll_id = id,
                account_id = input.account_id,
                net_pay = %payroll.net_pay,
                "Payroll paid"
            );
            Ok(ApiResponse::ok(PayrollPaid {
                payroll,
                transaction,
            }))
        }
        PayrollPayment::NotApproved => Err(changed_concurrently("Payroll")),
        PayrollPayment::AccountUnavailable => Err(AppError::business_rule(format!(
            "Account {} is no longer available",
            input.account_id
        ))),
    }
}

/// DELETE /api/payrolls/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_draft(&existing, "deleted")?;

    if PayrollRepo::delete_draft(&state.pool, auth.company_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(changed_concurrently("Payroll"))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find(state: &AppState, company_id: DbId, id: DbId) -> AppResult<Payroll> {
    PayrollRepo::find_by_id(&state.pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Payroll", id))
}

fn ensure_draft(payroll: &Payroll, action: &str) -> AppResult<()> {
    if payroll.status == PayrollStatus::Draft {
        Ok(())
    } else {
        Err(AppError::business_rule(format!(
            "Only draft payrolls can be {action} (status is {})",
            payroll.status.name()
        )))
    }
}
