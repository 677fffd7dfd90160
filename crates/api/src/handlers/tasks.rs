//! Handlers for the `/tasks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use ledgerline_core::lifecycle::ensure_transition;
use ledgerline_core::pagination::Page;
use ledgerline_core::types::DbId;
use ledgerline_db::models::task::{ChangeTaskStatus, CreateTask, Task, TaskFilter, UpdateTask};
use ledgerline_db::repositories::TaskRepo;

use super::{changed_concurrently, require_employee};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/tasks
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(filter): Query<TaskFilter>,
) -> AppResult<ApiResponse<Page<Task>>> {
    let tasks = TaskRepo::list(&state.pool, auth.company_id, &filter, page.to_request()).await?;
    Ok(ApiResponse::ok(tasks))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Task>> {
    let task = find(&state, auth.company_id, id).await?;
    Ok(ApiResponse::ok(task))
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateTask>,
) -> AppResult<ApiResponse<Task>> {
    if let Some(assignee_id) = input.assignee_id {
        require_employee(&state, auth.company_id, assignee_id, "assignee_id").await?;
    }
    let task = TaskRepo::create(&state.pool, auth.company_id, &input, auth.user_id).await?;
    Ok(ApiResponse::created(task))
}

/// PUT /api/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTask>,
) -> AppResult<ApiResponse<Task>> {
    if let Some(assignee_id) = input.assignee_id {
        require_employee(&state, auth.company_id, assignee_id, "assignee_id").await?;
    }
    let task = TaskRepo::update(&state.pool, auth.company_id, id, &input, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))?;
    Ok(ApiResponse::ok(task))
}

/// PUT /api/tasks/{id}/status
///
/// `completed_at` is stamped when a task is done and cleared on reopen.
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<ChangeTaskStatus>,
) -> AppResult<ApiResponse<Task>> {
    let existing = find(&state, auth.company_id, id).await?;
    if existing.status == input.status {
        return Ok(ApiResponse::ok(existing));
    }
    ensure_transition(existing.status, input.status)?;

    let task = TaskRepo::transition(
        &state.pool,
        auth.company_id,
        id,
        existing.status,
        input.status,
        auth.user_id,
    )
    .await?
    .ok_or_else(|| changed_concurrently("Task"))?;

    tracing::debug!(
        task_id = id,
        from = existing.status.name(),
        to = input.status.name(),
        "Task status changed"
    );
    Ok(ApiResponse::ok(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TaskRepo::delete(&state.pool, auth.company_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Task", id))
    }
}

async fn find(state: &AppState, company_id: DbId, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", id))
}
