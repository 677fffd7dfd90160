//! Time entry model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use ledgerline_core::types::{DbId, Timestamp};

/// A row from the `time_entries` table. `ended_at = None` means running.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub company_id: DbId,
    pub employee_id: DbId,
    pub task_id: Option<DbId>,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub minutes: i32,
    pub billable: bool,
    pub description: Option<String>,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for logging time. Omitting `ended_at` starts a running entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimeEntry {
    /// Required unless the caller is linked to an employee record.
    pub employee_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    #[serde(default)]
    pub billable: bool,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// DTO for editing an entry. Minutes are recomputed from the final range.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTimeEntry {
    pub task_id: Option<DbId>,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub billable: Option<bool>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Body of `POST /time-entries/{id}/stop`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopTimeEntry {
    /// Defaults to now.
    pub ended_at: Option<Timestamp>,
}

/// Query filters shared by the list and summary endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryFilter {
    pub employee_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub billable: Option<bool>,
    /// Entries started at or after this instant.
    pub from: Option<Timestamp>,
    /// Entries started before this instant.
    pub to: Option<Timestamp>,
}

/// Totals returned by `GET /time-entries/summary`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeSummary {
    pub entry_count: i64,
    pub total_minutes: i64,
    pub billable_minutes: i64,
}
