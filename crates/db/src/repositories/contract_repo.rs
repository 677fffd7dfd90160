//! Repository for the `contracts` table.

use sqlx::PgPool;
use ledgerline_core::lifecycle::ContractStatus;
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::{Date, DbId};

use crate::models::contract::{Contract, ContractFilter, CreateContract, UpdateContract};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, employee_id, title, counterparty, contract_type, \
                       start_date, end_date, value, status_id, notes, \
                       created_by, updated_by, created_at, updated_at";

/// List predicate; `$1` company, `$2` status, `$3` employee.
const FILTER: &str = "company_id = $1
    AND ($2::SMALLINT IS NULL OR status_id = $2)
    AND ($3::BIGINT IS NULL OR employee_id = $3)";

/// Provides CRUD operations for contracts.
pub struct ContractRepo;

impl ContractRepo {
    /// Insert a new contract in `draft` status.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateContract,
        actor: DbId,
    ) -> Result<Contract, sqlx::Error> {
        let query = format!(
            "INSERT INTO contracts
                (company_id, employee_id, title, counterparty, contract_type, start_date,
                 end_date, value, status_id, notes, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(company_id)
            .bind(input.employee_id)
            .bind(input.title.trim())
            .bind(input.counterparty.trim())
            .bind(input.contract_type.trim())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.value)
            .bind(ContractStatus::Draft.id())
            .bind(&input.notes)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find a contract by ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contracts WHERE company_id = $1 AND id = $2");
        sqlx::query_as::<_, Contract>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List contracts, most recent start date first.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        filter: &ContractFilter,
        page: PageRequest,
    ) -> Result<Page<Contract>, sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM contracts WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.status.map(ContractStatus::id))
            .bind(filter.employee_id)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM contracts WHERE {FILTER}
             ORDER BY start_date DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, Contract>(&query)
            .bind(company_id)
            .bind(filter.status.map(ContractStatus::id))
            .bind(filter.employee_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    /// Update a contract. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateContract,
        actor: DbId,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                employee_id = COALESCE($3, employee_id),
                title = COALESCE($4, title),
                counterparty = COALESCE($5, counterparty),
                contract_type = COALESCE($6, contract_type),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                value = COALESCE($9, value),
                notes = COALESCE($10, notes),
                updated_by = $11
             WHERE company_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(company_id)
            .bind(id)
            .bind(input.employee_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(input.counterparty.as_deref().map(str::trim))
            .bind(input.contract_type.as_deref().map(str::trim))
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.value)
            .bind(&input.notes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Move a contract from `from` to `to`, optionally setting the end date.
    ///
    /// Returns `None` when the stored status is no longer `from`.
    pub async fn transition(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        from: ContractStatus,
        to: ContractStatus,
        end_date: Option<Date>,
        actor: DbId,
    ) -> Result<Option<Contract>, sqlx::Error> {
        let query = format!(
            "UPDATE contracts SET
                status_id = $4,
                end_date = COALESCE($5, end_date),
                updated_by = $6
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contract>(&query)
            .bind(company_id)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(end_date)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a contract. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contracts WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
