//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::lifecycle::{TaskPriority, TaskStatus};
use ledgerline_core::types::{Date, DbId, Timestamp};
use ledgerline_core::validation::not_blank;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub company_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<Date>,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: TaskStatus,
    #[sqlx(rename = "priority_id", try_from = "i16")]
    pub priority: TaskPriority,
    pub completed_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a task. New tasks start as `todo`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<Date>,
    /// Defaults to `medium`.
    pub priority: Option<TaskPriority>,
}

/// DTO for editing a task. Status moves through `PUT /tasks/{id}/status`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub assignee_id: Option<DbId>,
    pub due_date: Option<Date>,
    pub priority: Option<TaskPriority>,
}

/// Body of `PUT /tasks/{id}/status`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeTaskStatus {
    pub status: TaskStatus,
}

/// Query filters for listing tasks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<DbId>,
    /// Case-insensitive match on the title.
    pub search: Option<String>,
}
