//! Repository for the `payrolls` table.

use sqlx::PgPool;
use ledgerline_core::lifecycle::{EmployeeStatus, PayrollStatus, TransactionKind, TransactionStatus};
use ledgerline_core::payroll::PayrollAmounts;
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::{Date, DbId, Money};

use crate::models::payroll::{GeneratedPayrolls, NewPayroll, Payroll, PayrollFilter};
use crate::models::transaction::FinancialTransaction;
use crate::repositories::transaction_repo::{apply_to_account, insert_in_tx, NewTransaction};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, employee_id, period_start, period_end, base_salary, \
                       bonus, deductions, gross_pay, net_pay, status_id, notes, approved_at, \
                       approved_by, paid_at, created_by, updated_by, created_at, updated_at";

/// List predicate; `$1` company, `$2` status, `$3` employee, `$4` from, `$5` to.
const FILTER: &str = "company_id = $1
    AND ($2::SMALLINT IS NULL OR status_id = $2)
    AND ($3::BIGINT IS NULL OR employee_id = $3)
    AND ($4::DATE IS NULL OR period_start >= $4)
    AND ($5::DATE IS NULL OR period_end <= $5)";

async fn insert_in_tx_payroll(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: DbId,
    input: &NewPayroll,
    actor: DbId,
) -> Result<Payroll, sqlx::Error> {
    let query = format!(
        "INSERT INTO payrolls
            (company_id, employee_id, period_start, period_end, base_salary, bonus,
             deductions, gross_pay, net_pay, status_id, notes, created_by, updated_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Payroll>(&query)
        .bind(company_id)
        .bind(input.employee_id)
        .bind(input.period_start)
        .bind(input.period_end)
        .bind(input.amounts.base_salary)
        .bind(input.amounts.bonus)
        .bind(input.amounts.deductions)
        .bind(input.amounts.gross_pay)
        .bind(input.amounts.net_pay)
        .bind(PayrollStatus::Draft.id())
        .bind(&input.notes)
        .bind(actor)
        .fetch_one(&mut **tx)
        .await
}

/// Outcome of [`PayrollRepo::pay`].
#[derive(Debug)]
pub enum PayrollPayment {
    Paid {
        payroll: Payroll,
        /// `None` when the net pay was zero.
        transaction: Option<FinancialTransaction>,
    },
    /// The record was no longer approved.
    NotApproved,
    /// The account is missing or inactive.
    AccountUnavailable,
}

/// Provides CRUD and workflow operations for payroll records.
pub struct PayrollRepo;

impl PayrollRepo {
    /// Insert a single draft record.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &NewPayroll,
        actor: DbId,
    ) -> Result<Payroll, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let payroll = insert_in_tx_payroll(&mut tx, company_id, input, actor).await?;
        tx.commit().await?;
        Ok(payroll)
    }

    /// Create one draft per active employee that has no record for exactly
    /// this period yet. Base salary is taken from the employee.
    pub async fn generate(
        pool: &PgPool,
        company_id: DbId,
        period_start: Date,
        period_end: Date,
        actor: DbId,
    ) -> Result<GeneratedPayrolls, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let candidates: Vec<(DbId, Money, bool)> = sqlx::query_as(
            "SELECT e.id, e.base_salary,
                    EXISTS (SELECT 1 FROM payrolls p
                            WHERE p.employee_id = e.id
                              AND p.period_start = $3 AND p.period_end = $4) AS has_record
             FROM employees e
             WHERE e.company_id = $1 AND e.status_id = $2
             ORDER BY e.id
             FOR UPDATE OF e",
        )
        .bind(company_id)
        .bind(EmployeeStatus::Active.id())
        .bind(period_start)
        .bind(period_end)
        .fetch_all(&mut *tx)
        .await?;

        let mut created = Vec::new();
        let mut skipped = 0i64;
        for (employee_id, base_salary, has_record) in candidates {
            if has_record {
                skipped += 1;
                continue;
            }
            let amounts = PayrollAmounts::from_base_salary(base_salary);
            let payroll = insert_in_tx_payroll(
                &mut tx,
                company_id,
                &NewPayroll {
                    employee_id,
                    period_start,
                    period_end,
                    amounts,
                    notes: None,
                },
                actor,
            )
            .await?;
            created.push(payroll);
        }

        tx.commit().await?;
        Ok(GeneratedPayrolls { created, skipped })
    }

    /// Find a payroll record by ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Payroll>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payrolls WHERE company_id = $1 AND id = $2");
        sqlx::query_as::<_, Payroll>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List payroll records, latest period first.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        filter: &PayrollFilter,
        page: PageRequest,
    ) -> Result<Page<Payroll>, sqlx::Error> {
        let count_query = format!("SELECT COUNT(*) FROM payrolls WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.status.map(PayrollStatus::id))
            .bind(filter.employee_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM payrolls WHERE {FILTER}
             ORDER BY period_start DESC, employee_id ASC
             LIMIT $6 OFFSET $7"
        );
        let items = sqlx::query_as::<_, Payroll>(&query)
            .bind(company_id)
            .bind(filter.status.map(PayrollStatus::id))
            .bind(filter.employee_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    /// Replace the amounts and notes of a draft record.
    ///
    /// Returns `None` if it does not exist or is no longer a draft.
    pub async fn update_draft(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        amounts: &PayrollAmounts,
        notes: Option<&str>,
        actor: DbId,
    ) -> Result<Option<Payroll>, sqlx::Error> {
        let query = format!(
            "UPDATE payrolls SET
                base_salary = $4,
                bonus = $5,
                deductions = $6,
                gross_pay = $7,
                net_pay = $8,
                notes = COALESCE($9, notes),
                updated_by = $10
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payroll>(&query)
            .bind(company_id)
            .bind(id)
            .bind(PayrollStatus::Draft.id())
            .bind(amounts.base_salary)
            .bind(amounts.bonus)
            .bind(amounts.deductions)
            .bind(amounts.gross_pay)
            .bind(amounts.net_pay)
            .bind(notes)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Approve a draft record. Returns `None` if it is not a draft.
    pub async fn approve(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        actor: DbId,
    ) -> Result<Option<Payroll>, sqlx::Error> {
        let query = format!(
            "UPDATE payrolls SET
                status_id = $4, approved_at = NOW(), approved_by = $5, updated_by = $5
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payroll>(&query)
            .bind(company_id)
            .bind(id)
            .bind(PayrollStatus::Draft.id())
            .bind(PayrollStatus::Approved.id())
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Pay an approved record: mark it paid, record a paid payable for the
    /// net pay and debit the account, all in one transaction.
    pub async fn pay(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        account_id: DbId,
        counterparty: &str,
        actor: DbId,
    ) -> Result<PayrollPayment, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE payrolls SET status_id = $4, paid_at = NOW(), updated_by = $5
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        let payroll = sqlx::query_as::<_, Payroll>(&query)
            .bind(company_id)
            .bind(id)
            .bind(PayrollStatus::Approved.id())
            .bind(PayrollStatus::Paid.id())
            .bind(actor)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(payroll) = payroll else {
            tx.rollback().await?;
            return Ok(PayrollPayment::NotApproved);
        };

        if !apply_to_account(
            &mut tx,
            company_id,
            account_id,
            TransactionKind::Payable,
            payroll.net_pay,
            actor,
        )
        .await?
        {
            tx.rollback().await?;
            return Ok(PayrollPayment::AccountUnavailable);
        }

        // A zero net pay settles nothing; amounts must be positive.
        let transaction = if payroll.net_pay.is_zero() {
            None
        } else {
            Some(
                insert_in_tx(
                    &mut tx,
                    company_id,
                    &NewTransaction {
                        kind: TransactionKind::Payable,
                        status: TransactionStatus::Paid,
                        account_id: Some(account_id),
                        counterparty: counterparty.to_string(),
                        description: Some(format!(
                            "Payroll {} to {}",
                            payroll.period_start, payroll.period_end
                        )),
                        reference: None,
                        amount: payroll.net_pay,
                        due_date: Some(payroll.period_end),
                        purchase_order_id: None,
                        payroll_id: Some(payroll.id),
                    },
                    actor,
                )
                .await?,
            )
        };

        tx.commit().await?;
        Ok(PayrollPayment::Paid {
            payroll,
            transaction,
        })
    }

    /// Delete a draft record. Returns `true` if a row was removed.
    pub async fn delete_draft(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM payrolls WHERE company_id = $1 AND id = $2 AND status_id = $3",
        )
        .bind(company_id)
        .bind(id)
        .bind(PayrollStatus::Draft.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
