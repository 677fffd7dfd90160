//! Repository for the `employees` table.

use sqlx::PgPool;
use ledgerline_core::lifecycle::EmployeeStatus;
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::DbId;

use crate::models::employee::{CreateEmployee, Employee, EmployeeFilter, UpdateEmployee};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, user_id, first_name, last_name, email, phone, position, \
                       department, hire_date, termination_date, base_salary, status_id, \
                       created_by, updated_by, created_at, updated_at";

/// List predicate; `$1` company, `$2` status, `$3` department, `$4` search.
const FILTER: &str = "company_id = $1
    AND ($2::SMALLINT IS NULL OR status_id = $2)
    AND ($3::TEXT IS NULL OR department = $3)
    AND ($4::TEXT IS NULL
         OR first_name ILIKE '%' || $4 || '%'
         OR last_name ILIKE '%' || $4 || '%'
         OR email ILIKE '%' || $4 || '%')";

/// Upper bound on rows written by the CSV export.
pub const EXPORT_LIMIT: i64 = 10_000;

/// Provides CRUD operations for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert a new employee in `active` status.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateEmployee,
        actor: DbId,
    ) -> Result<Employee, sqlx::Error> {
        let query = format!(
            "INSERT INTO employees
                (company_id, user_id, first_name, last_name, email, phone, position,
                 department, hire_date, base_salary, status_id, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(company_id)
            .bind(input.user_id)
            .bind(input.first_name.trim())
            .bind(input.last_name.trim())
            .bind(input.email.trim())
            .bind(&input.phone)
            .bind(&input.position)
            .bind(&input.department)
            .bind(input.hire_date)
            .bind(input.base_salary)
            .bind(EmployeeStatus::Active.id())
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find an employee by ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM employees WHERE company_id = $1 AND id = $2");
        sqlx::query_as::<_, Employee>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the employee record linked to a login.
    pub async fn find_by_user(
        pool: &PgPool,
        company_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM employees WHERE company_id = $1 AND user_id = $2");
        sqlx::query_as::<_, Employee>(&query)
            .bind(company_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List employees by last name, then first name.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        filter: &EmployeeFilter,
        page: PageRequest,
    ) -> Result<Page<Employee>, sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM employees WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.status.map(EmployeeStatus::id))
            .bind(&filter.department)
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;

        let items = Self::select(pool, company_id, filter, page.limit(), page.offset()).await?;
        Ok(Page::new(items, page, total))
    }

    /// Every matching employee (capped at [`EXPORT_LIMIT`]) for the CSV export.
    pub async fn list_for_export(
        pool: &PgPool,
        company_id: DbId,
        filter: &EmployeeFilter,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        Self::select(pool, company_id, filter, EXPORT_LIMIT, 0).await
    }

    async fn select(
        pool: &PgPool,
        company_id: DbId,
        filter: &EmployeeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employees WHERE {FILTER}
             ORDER BY last_name ASC, first_name ASC, id ASC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(company_id)
            .bind(filter.status.map(EmployeeStatus::id))
            .bind(&filter.department)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update an employee. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateEmployee,
        actor: DbId,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let query = format!(
            "UPDATE employees SET
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                position = COALESCE($7, position),
                department = COALESCE($8, department),
                hire_date = COALESCE($9, hire_date),
                termination_date = COALESCE($10, termination_date),
                base_salary = COALESCE($11, base_salary),
                status_id = COALESCE($12, status_id),
                user_id = COALESCE($13, user_id),
                updated_by = $14
             WHERE company_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(company_id)
            .bind(id)
            .bind(input.first_name.as_deref().map(str::trim))
            .bind(input.last_name.as_deref().map(str::trim))
            .bind(input.email.as_deref().map(str::trim))
            .bind(&input.phone)
            .bind(&input.position)
            .bind(&input.department)
            .bind(input.hire_date)
            .bind(input.termination_date)
            .bind(input.base_salary)
            .bind(input.status.map(EmployeeStatus::id))
            .bind(input.user_id)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an employee. Returns `true` if a row was removed.
    ///
    /// Fails with a foreign-key violation while payroll records reference it.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
