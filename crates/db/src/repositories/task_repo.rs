//! Repository for the `tasks` table.

use sqlx::PgPool;
use ledgerline_core::lifecycle::{TaskPriority, TaskStatus};
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::DbId;

use crate::models::task::{CreateTask, Task, TaskFilter, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, title, description, assignee_id, due_date, status_id, \
                       priority_id, completed_at, created_by, updated_by, created_at, updated_at";

/// List predicate; `$1` company, `$2` status, `$3` priority, `$4` assignee, `$5` search.
const FILTER: &str = "company_id = $1
    AND ($2::SMALLINT IS NULL OR status_id = $2)
    AND ($3::SMALLINT IS NULL OR priority_id = $3)
    AND ($4::BIGINT IS NULL OR assignee_id = $4)
    AND ($5::TEXT IS NULL OR title ILIKE '%' || $5 || '%')";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task in `todo` status.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateTask,
        actor: DbId,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (company_id, title, description, assignee_id, due_date, status_id, priority_id,
                 created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(company_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.assignee_id)
            .bind(input.due_date)
            .bind(TaskStatus::Todo.id())
            .bind(input.priority.unwrap_or(TaskPriority::Medium).id())
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a task by ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE company_id = $1 AND id = $2");
        sqlx::query_as::<_, Task>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks: highest priority first, then earliest due date.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Page<Task>, sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM tasks WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.status.map(TaskStatus::id))
            .bind(filter.priority.map(TaskPriority::id))
            .bind(filter.assignee_id)
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE {FILTER}
             ORDER BY priority_id DESC, due_date ASC NULLS LAST, id ASC
             LIMIT $6 OFFSET $7"
        );
        let items = sqlx::query_as::<_, Task>(&query)
            .bind(company_id)
            .bind(filter.status.map(TaskStatus::id))
            .bind(filter.priority.map(TaskPriority::id))
            .bind(filter.assignee_id)
            .bind(&filter.search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    /// Update a task. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateTask,
        actor: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                assignee_id = COALESCE($5, assignee_id),
                due_date = COALESCE($6, due_date),
                priority_id = COALESCE($7, priority_id),
                updated_by = $8
             WHERE company_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(company_id)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.assignee_id)
            .bind(input.due_date)
            .bind(input.priority.map(TaskPriority::id))
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Move a task from `from` to `to`. `completed_at` is set when entering
    /// `done` and cleared otherwise.
    ///
    /// Returns `None` when the stored status is no longer `from`.
    pub async fn transition(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        from: TaskStatus,
        to: TaskStatus,
        actor: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                status_id = $4,
                completed_at = CASE WHEN $4 = $6 THEN NOW() ELSE NULL END,
                updated_by = $5
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(company_id)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(actor)
            .bind(TaskStatus::Done.id())
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a task. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
