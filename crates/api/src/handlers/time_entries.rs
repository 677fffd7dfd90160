//! Handlers for the `/time-entries` resource.
//!
//! Callers with the `employee` role only see and edit their own entries; the
//! employee record linked to their login is substituted for any
//! `employee_id` they send.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use ledgerline_core::pagination::Page;
use ledgerline_core::roles::ROLE_EMPLOYEE;
use ledgerline_core::time_tracking::{format_minutes, optional_entry_minutes};
use ledgerline_core::types::{DbId, Timestamp};
use ledgerline_db::models::time_entry::{
    CreateTimeEntry, StopTimeEntry, TimeEntry, TimeEntryFilter, TimeSummary, UpdateTimeEntry,
};
use ledgerline_db::repositories::{EmployeeRepo, TaskRepo, TimeEntryRepo, TimeEntryValues};
use serde::Serialize;

use super::{changed_concurrently, require_employee};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::{OptionalJson, ValidatedJson};
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Response of `GET /time-entries/summary`: raw minute totals plus `H:MM`
/// renderings.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub totals: TimeSummary,
    pub total_hours: String,
    pub billable_hours: String,
}

/// GET /api/time-entries
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(mut filter): Query<TimeEntryFilter>,
) -> AppResult<ApiResponse<Page<TimeEntry>>> {
    if let Some(own) = own_employee_id(&state, &auth).await? {
        filter.employee_id = Some(own);
    }
    let entries =
        TimeEntryRepo::list(&state.pool, auth.company_id, &filter, page.to_request()).await?;
    Ok(ApiResponse::ok(entries))
}

/// GET /api/time-entries/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(mut filter): Query<TimeEntryFilter>,
) -> AppResult<ApiResponse<SummaryResponse>> {
    if let Some(own) = own_employee_id(&state, &auth).await? {
        filter.employee_id = Some(own);
    }
    let totals = TimeEntryRepo::summary(&state.pool, auth.company_id, &filter).await?;
    Ok(ApiResponse::ok(SummaryResponse {
        total_hours: format_minutes(totals.total_minutes),
        billable_hours: format_minutes(totals.billable_minutes),
        totals,
    }))
}

/// GET /api/time-entries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<TimeEntry>> {
    let entry = find_visible(&state, &auth, id).await?;
    Ok(ApiResponse::ok(entry))
}

/// POST /api/time-entries
///
/// Without `ended_at` the entry is started as running. An employee can only
/// have one running entry; a second one is a conflict.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateTimeEntry>,
) -> AppResult<ApiResponse<TimeEntry>> {
    let employee_id = match own_employee_id(&state, &auth).await? {
        Some(own) => own,
        None => match input.employee_id {
            Some(id) => require_employee(&state, auth.company_id, id, "employee_id").await?.id,
            None => linked_employee_id(&state, &auth).await?,
        },
    };
    if let Some(task_id) = input.task_id {
        require_task(&state, auth.company_id, task_id).await?;
    }

    let values = TimeEntryValues {
        employee_id,
        task_id: input.task_id,
        started_at: input.started_at,
        ended_at: input.ended_at,
        minutes: minutes_between(input.started_at, input.ended_at)?,
        billable: input.billable,
        description: input.description,
    };
    let entry = TimeEntryRepo::create(&state.pool, auth.company_id, &values, auth.user_id).await?;
    tracing::debug!(
        time_entry_id = entry.id,
        employee_id,
        running = entry.ended_at.is_none(),
        "Time entry created"
    );
    Ok(ApiResponse::created(entry))
}

/// PUT /api/time-entries/{id}
///
/// Minutes are recomputed from the merged start and end.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTimeEntry>,
) -> AppResult<ApiResponse<TimeEntry>> {
    let existing = find_visible(&state, &auth, id).await?;
    if let Some(task_id) = input.task_id {
        require_task(&state, auth.company_id, task_id).await?;
    }

    let started_at = input.started_at.unwrap_or(existing.started_at);
    let ended_at = input.ended_at.or(existing.ended_at);
    let values = TimeEntryValues {
        employee_id: existing.employee_id,
        task_id: input.task_id.or(existing.task_id),
        started_at,
        ended_at,
        minutes: minutes_between(started_at, ended_at)?,
        billable: input.billable.unwrap_or(existing.billable),
        description: input.description.or(existing.description),
    };

    let entry = TimeEntryRepo::update(&state.pool, auth.company_id, id, &values, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("TimeEntry", id))?;
    Ok(ApiResponse::ok(entry))
}

/// POST /api/time-entries/{id}/stop
///
/// Ends a running entry, at `now` unless an end is given.
pub async fn stop(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    OptionalJson(input): OptionalJson<StopTimeEntry>,
) -> AppResult<ApiResponse<TimeEntry>> {
    let existing = find_visible(&state, &auth, id).await?;
    if existing.ended_at.is_some() {
        return Err(AppError::business_rule("Time entry is not running"));
    }

    let ended_at = input.ended_at.unwrap_or_else(Utc::now);
    let minutes = minutes_between(existing.started_at, Some(ended_at))?;
    let entry = TimeEntryRepo::stop(&state.pool, auth.company_id, id, ended_at, minutes, auth.user_id)
        .await?
        .ok_or_else(|| changed_concurrently("TimeEntry"))?;
    tracing::debug!(time_entry_id = id, minutes, "Time entry stopped");
    Ok(ApiResponse::ok(entry))
}

/// DELETE /api/time-entries/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_visible(&state, &auth, id).await?;
    if TimeEntryRepo::delete(&state.pool, auth.company_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("TimeEntry", id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The caller's own employee id when their role restricts them to their own
/// entries; `None` for every other role.
async fn own_employee_id(state: &AppState, auth: &AuthUser) -> AppResult<Option<DbId>> {
    if auth.role != ROLE_EMPLOYEE {
        return Ok(None);
    }
    linked_employee_id(state, auth).await.map(Some)
}

async fn linked_employee_id(state: &AppState, auth: &AuthUser) -> AppResult<DbId> {
    EmployeeRepo::find_by_user(&state.pool, auth.company_id, auth.user_id)
        .await?
        .map(|e| e.id)
        .ok_or_else(|| {
            AppError::business_rule("No employee record is linked to the current user")
        })
}

/// Load an entry, hiding other employees' entries from restricted callers.
async fn find_visible(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<TimeEntry> {
    let entry = TimeEntryRepo::find_by_id(&state.pool, auth.company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("TimeEntry", id))?;
    match own_employee_id(state, auth).await? {
        Some(own) if own != entry.employee_id => Err(AppError::not_found("TimeEntry", id)),
        _ => Ok(entry),
    }
}

async fn require_task(state: &AppState, company_id: DbId, task_id: DbId) -> AppResult<()> {
    TaskRepo::find_by_id(&state.pool, company_id, task_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation(format!("task_id: task {task_id} not found")))
}

fn minutes_between(started_at: Timestamp, ended_at: Option<Timestamp>) -> AppResult<i32> {
    let minutes = optional_entry_minutes(started_at, ended_at)?;
    i32::try_from(minutes)
        .map_err(|_| AppError::validation("ended_at: entry is too long"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};
    use ledgerline_core::error::CoreError;

    use super::*;

    #[test]
    fn running_entries_have_zero_minutes() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        assert_eq!(minutes_between(start, None).unwrap(), 0);
        assert_eq!(minutes_between(start, Some(start + Duration::minutes(45))).unwrap(), 45);
    }

    #[test]
    fn end_before_start_is_a_validation_error() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        assert_matches!(
            minutes_between(start, Some(start - Duration::minutes(1))),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }

    #[test]
    fn stopping_an_entry_running_for_days_succeeds() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let minutes = minutes_between(start, Some(start + Duration::days(3))).unwrap();
        assert_eq!(minutes, 3 * 24 * 60);
    }
}
