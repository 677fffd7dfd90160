//! Handlers for the `/employees` resource, including the CSV export.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use ledgerline_core::export::csv_row;
use ledgerline_core::lifecycle::{ensure_transition, EmployeeStatus};
use ledgerline_core::pagination::Page;
use ledgerline_core::types::{Date, DbId};
use ledgerline_db::models::employee::{CreateEmployee, Employee, EmployeeFilter, UpdateEmployee};
use ledgerline_db::repositories::employee_repo::EXPORT_LIMIT;
use ledgerline_db::repositories::{EmployeeRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

const EXPORT_HEADER: [&str; 11] = [
    "id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "position",
    "department",
    "hire_date",
    "termination_date",
    "base_salary",
    "status",
];

/// GET /api/employees
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(filter): Query<EmployeeFilter>,
) -> AppResult<ApiResponse<Page<Employee>>> {
    let employees =
        EmployeeRepo::list(&state.pool, auth.company_id, &filter, page.to_request()).await?;
    Ok(ApiResponse::ok(employees))
}

/// GET /api/employees/export
///
/// Same filters as the list endpoint; returns `text/csv`.
pub async fn export_csv(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<EmployeeFilter>,
) -> AppResult<impl IntoResponse> {
    let employees = EmployeeRepo::list_for_export(&state.pool, auth.company_id, &filter).await?;
    if employees.len() as i64 >= EXPORT_LIMIT {
        tracing::warn!(company_id = auth.company_id, limit = EXPORT_LIMIT, "Employee export truncated");
    }

    let mut csv = csv_row(EXPORT_HEADER);
    for e in &employees {
        csv.push_str(&csv_row([
            e.id.to_string(),
            e.first_name.clone(),
            e.last_name.clone(),
            e.email.clone(),
            e.phone.clone().unwrap_or_default(),
            e.position.clone().unwrap_or_default(),
            e.department.clone().unwrap_or_default(),
            e.hire_date.to_string(),
            e.termination_date.map(|d| d.to_string()).unwrap_or_default(),
            e.base_salary.to_string(),
            e.status.name().to_string(),
        ]));
    }

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"employees.csv\""),
        ],
        csv,
    ))
}

/// GET /api/employees/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Employee>> {
    let employee = find(&state, auth.company_id, id).await?;
    Ok(ApiResponse::ok(employee))
}

/// POST /api/employees
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateEmployee>,
) -> AppResult<ApiResponse<Employee>> {
    if let Some(user_id) = input.user_id {
        ensure_company_user(&state, auth.company_id, user_id).await?;
    }
    let employee = EmployeeRepo::create(&state.pool, auth.company_id, &input, auth.user_id).await?;
    Ok(ApiResponse::created(employee))
}

/// PUT /api/employees/{id}
///
/// Status changes follow the employee lifecycle; moving to `terminated`
/// needs a termination date on or after the hire date.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateEmployee>,
) -> AppResult<ApiResponse<Employee>> {
    let existing = find(&state, auth.company_id, id).await?;

    let next_status = input.status.unwrap_or(existing.status);
    if next_status != existing.status {
        ensure_transition(existing.status, next_status)?;
    }
    check_termination(
        next_status,
        input.hire_date.unwrap_or(existing.hire_date),
        input.termination_date.or(existing.termination_date),
    )?;
    if let Some(user_id) = input.user_id {
        ensure_company_user(&state, auth.company_id, user_id).await?;
    }

    let employee = EmployeeRepo::update(&state.pool, auth.company_id, id, &input, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee", id))?;
    Ok(ApiResponse::ok(employee))
}

/// DELETE /api/employees/{id}
///
/// Employees referenced by payroll records cannot be deleted; terminate
/// them instead.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if EmployeeRepo::delete(&state.pool, auth.company_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Employee", id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find(state: &AppState, company_id: DbId, id: DbId) -> AppResult<Employee> {
    EmployeeRepo::find_by_id(&state.pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Employee", id))
}

async fn ensure_company_user(state: &AppState, company_id: DbId, user_id: DbId) -> AppResult<()> {
    match UserRepo::find_by_id(&state.pool, user_id).await? {
        Some(user) if user.company_id == company_id => Ok(()),
        _ => Err(AppError::validation(format!("user_id: user {user_id} not found"))),
    }
}

/// A termination date may only be set on or after the hire date, and a
/// terminated employee must have one.
fn check_termination(
    status: EmployeeStatus,
    hire_date: Date,
    termination_date: Option<Date>,
) -> AppResult<()> {
    match termination_date {
        Some(end) if end < hire_date => Err(AppError::validation(
            "termination_date: must not precede hire_date",
        )),
        None if status == EmployeeStatus::Terminated => Err(AppError::validation(
            "termination_date: required when terminating an employee",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use ledgerline_core::error::CoreError;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn termination_needs_a_date() {
        assert_matches!(
            check_termination(EmployeeStatus::Terminated, date(2024, 1, 1), None),
            Err(AppError::Core(CoreError::Validation(_)))
        );
        assert!(check_termination(EmployeeStatus::Active, date(2024, 1, 1), None).is_ok());
    }

    #[test]
    fn termination_date_cannot_precede_hire_date() {
        assert_matches!(
            check_termination(
                EmployeeStatus::Terminated,
                date(2024, 5, 1),
                Some(date(2024, 4, 30))
            ),
            Err(AppError::Core(CoreError::Validation(_)))
        );
        assert!(check_termination(
            EmployeeStatus::Terminated,
            date(2024, 5, 1),
            Some(date(2024, 5, 1))
        )
        .is_ok());
    }
}
