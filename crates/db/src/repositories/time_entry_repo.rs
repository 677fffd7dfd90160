//! Repository for the `time_entries` table.
//!
//! The partial unique index `uq_time_entries_running` enforces at most one
//! running entry per employee; a second start surfaces as a unique violation.

use sqlx::PgPool;
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::{DbId, Timestamp};

use crate::models::time_entry::{TimeEntry, TimeEntryFilter, TimeSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, employee_id, task_id, started_at, ended_at, minutes, \
                       billable, description, created_by, updated_by, created_at, updated_at";

/// List predicate; `$1` company, `$2` employee, `$3` task, `$4` billable,
/// `$5` from, `$6` to.
const FILTER: &str = "company_id = $1
    AND ($2::BIGINT IS NULL OR employee_id = $2)
    AND ($3::BIGINT IS NULL OR task_id = $3)
    AND ($4::BOOLEAN IS NULL OR billable = $4)
    AND ($5::TIMESTAMPTZ IS NULL OR started_at >= $5)
    AND ($6::TIMESTAMPTZ IS NULL OR started_at < $6)";

/// A fully resolved entry ready to be written.
#[derive(Debug, Clone)]
pub struct TimeEntryValues {
    pub employee_id: DbId,
    pub task_id: Option<DbId>,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub minutes: i32,
    pub billable: bool,
    pub description: Option<String>,
}

/// Provides CRUD operations for time entries.
pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Insert an entry. Minutes must already be computed.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        values: &TimeEntryValues,
        actor: DbId,
    ) -> Result<TimeEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO time_entries
                (company_id, employee_id, task_id, started_at, ended_at, minutes, billable,
                 description, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(company_id)
            .bind(values.employee_id)
            .bind(values.task_id)
            .bind(values.started_at)
            .bind(values.ended_at)
            .bind(values.minutes)
            .bind(values.billable)
            .bind(&values.description)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find an entry by ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM time_entries WHERE company_id = $1 AND id = $2");
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List entries, most recently started first.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        filter: &TimeEntryFilter,
        page: PageRequest,
    ) -> Result<Page<TimeEntry>, sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM time_entries WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.employee_id)
            .bind(filter.task_id)
            .bind(filter.billable)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM time_entries WHERE {FILTER}
             ORDER BY started_at DESC, id DESC
             LIMIT $7 OFFSET $8"
        );
        let items = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(company_id)
            .bind(filter.employee_id)
            .bind(filter.task_id)
            .bind(filter.billable)
            .bind(filter.from)
            .bind(filter.to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    /// Overwrite an entry with resolved values.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        values: &TimeEntryValues,
        actor: DbId,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE time_entries SET
                task_id = $3,
                started_at = $4,
                ended_at = $5,
                minutes = $6,
                billable = $7,
                description = $8,
                updated_by = $9
             WHERE company_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(company_id)
            .bind(id)
            .bind(values.task_id)
            .bind(values.started_at)
            .bind(values.ended_at)
            .bind(values.minutes)
            .bind(values.billable)
            .bind(&values.description)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Stop a running entry. Returns `None` if it is not running.
    pub async fn stop(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        ended_at: Timestamp,
        minutes: i32,
        actor: DbId,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE time_entries SET ended_at = $3, minutes = $4, updated_by = $5
             WHERE company_id = $1 AND id = $2 AND ended_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(company_id)
            .bind(id)
            .bind(ended_at)
            .bind(minutes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM time_entries WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Totals over the entries matching `filter`. Running entries count as zero.
    pub async fn summary(
        pool: &PgPool,
        company_id: DbId,
        filter: &TimeEntryFilter,
    ) -> Result<TimeSummary, sqlx::Error> {
        let query = format!(
            "SELECT
                COUNT(*) AS entry_count,
                COALESCE(SUM(minutes), 0)::BIGINT AS total_minutes,
                COALESCE(SUM(minutes) FILTER (WHERE billable), 0)::BIGINT AS billable_minutes
             FROM time_entries WHERE {FILTER}"
        );
        sqlx::query_as::<_, TimeSummary>(&query)
            .bind(company_id)
            .bind(filter.employee_id)
            .bind(filter.task_id)
            .bind(filter.billable)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(pool)
            .await
    }
}
