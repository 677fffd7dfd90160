//! Repository for the `financial_transactions` table.
//!
//! Paying a transaction and adjusting the account balance happen in one
//! database transaction. Purchase order receipt and payroll payment reuse
//! [`insert_in_tx`] and [`apply_to_account`] inside their own transactions.

use chrono::Utc;
use sqlx::PgPool;
use ledgerline_core::finance::balance_delta;
use ledgerline_core::lifecycle::{TransactionKind, TransactionStatus};
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::{Date, DbId, Money};

use crate::models::transaction::{
    CreateTransaction, FinancialTransaction, TransactionFilter, TransactionSummary,
    UpdateTransaction,
};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, company_id, kind_id, status_id, account_id, counterparty, \
                                  description, reference, amount, due_date, paid_at, \
                                  purchase_order_id, payroll_id, \
                                  created_by, updated_by, created_at, updated_at";

/// List predicate; `$1` company, `$2` kind, `$3` status, `$4` account,
/// `$5` overdue-only flag, `$6` today.
const FILTER: &str = "company_id = $1
    AND ($2::SMALLINT IS NULL OR kind_id = $2)
    AND ($3::SMALLINT IS NULL OR status_id = $3)
    AND ($4::BIGINT IS NULL OR account_id = $4)
    AND (COALESCE($5, false) = false OR (status_id = 1 AND due_date < $6))";

/// Insert payload used by flows that create transactions internally.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub account_id: Option<DbId>,
    pub counterparty: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub amount: Money,
    pub due_date: Option<Date>,
    pub purchase_order_id: Option<DbId>,
    pub payroll_id: Option<DbId>,
}

/// Insert a transaction inside an open database transaction.
pub(crate) async fn insert_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: DbId,
    input: &NewTransaction,
    actor: DbId,
) -> Result<FinancialTransaction, sqlx::Error> {
    let query = format!(
        "INSERT INTO financial_transactions
            (company_id, kind_id, status_id, account_id, counterparty, description, reference,
             amount, due_date, paid_at, purchase_order_id, payroll_id, created_by, updated_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                 CASE WHEN $3 = 2 THEN NOW() END, $10, $11, $12, $12)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, FinancialTransaction>(&query)
        .bind(company_id)
        .bind(input.kind.id())
        .bind(input.status.id())
        .bind(input.account_id)
        .bind(&input.counterparty)
        .bind(&input.description)
        .bind(&input.reference)
        .bind(input.amount)
        .bind(input.due_date)
        .bind(input.purchase_order_id)
        .bind(input.payroll_id)
        .bind(actor)
        .fetch_one(&mut **tx)
        .await
}

/// Add the signed settlement amount to an account balance.
///
/// Returns `false` when the account does not exist in the company or is
/// inactive, in which case the caller must roll back.
pub(crate) async fn apply_to_account(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: DbId,
    account_id: DbId,
    kind: TransactionKind,
    amount: Money,
    actor: DbId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE accounts SET balance = balance + $3, updated_by = $4
         WHERE company_id = $1 AND id = $2 AND is_active = true",
    )
    .bind(company_id)
    .bind(account_id)
    .bind(balance_delta(kind, amount))
    .bind(actor)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Outcome of [`TransactionRepo::pay`].
#[derive(Debug)]
pub enum PayOutcome {
    Paid(FinancialTransaction),
    /// The transaction was no longer pending.
    NotPending,
    /// The settlement account is missing or inactive.
    AccountUnavailable,
}

/// Provides CRUD operations for payables and receivables.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Insert a new pending transaction.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateTransaction,
        actor: DbId,
    ) -> Result<FinancialTransaction, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let created = insert_in_tx(
            &mut tx,
            company_id,
            &NewTransaction {
                kind: input.kind,
                status: TransactionStatus::Pending,
                account_id: input.account_id,
                counterparty: input.counterparty.trim().to_string(),
                description: input.description.clone(),
                reference: input.reference.clone(),
                amount: input.amount,
                due_date: input.due_date,
                purchase_order_id: None,
                payroll_id: None,
            },
            actor,
        )
        .await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Find a transaction by ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<FinancialTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM financial_transactions WHERE company_id = $1 AND id = $2"
        );
        sqlx::query_as::<_, FinancialTransaction>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List transactions, earliest due date first (undated last).
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<FinancialTransaction>, sqlx::Error> {
        let today = Utc::now().date_naive();

        let count_query = format!("SELECT COUNT(*) FROM financial_transactions WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(company_id)
            .bind(filter.kind.map(TransactionKind::id))
            .bind(filter.status.map(TransactionStatus::id))
            .bind(filter.account_id)
            .bind(filter.overdue)
            .bind(today)
            .fetch_one(pool)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM financial_transactions WHERE {FILTER}
             ORDER BY due_date ASC NULLS LAST, id DESC
             LIMIT $7 OFFSET $8"
        );
        let items = sqlx::query_as::<_, FinancialTransaction>(&query)
            .bind(company_id)
            .bind(filter.kind.map(TransactionKind::id))
            .bind(filter.status.map(TransactionStatus::id))
            .bind(filter.account_id)
            .bind(filter.overdue)
            .bind(today)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    /// Update a pending transaction. Returns `None` if it does not exist in
    /// the company or is no longer pending.
    pub async fn update_pending(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateTransaction,
        actor: DbId,
    ) -> Result<Option<FinancialTransaction>, sqlx::Error> {
        let query = format!(
            "UPDATE financial_transactions SET
                account_id = COALESCE($4, account_id),
                counterparty = COALESCE($5, counterparty),
                description = COALESCE($6, description),
                reference = COALESCE($7, reference),
                amount = COALESCE($8, amount),
                due_date = COALESCE($9, due_date),
                updated_by = $10
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialTransaction>(&query)
            .bind(company_id)
            .bind(id)
            .bind(TransactionStatus::Pending.id())
            .bind(input.account_id)
            .bind(input.counterparty.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.reference)
            .bind(input.amount)
            .bind(input.due_date)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Mark a pending transaction paid and apply it to `account_id`.
    pub async fn pay(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        account_id: DbId,
        actor: DbId,
    ) -> Result<PayOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE financial_transactions SET
                status_id = $4,
                paid_at = NOW(),
                account_id = $5,
                updated_by = $6
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        let paid = sqlx::query_as::<_, FinancialTransaction>(&query)
            .bind(company_id)
            .bind(id)
            .bind(TransactionStatus::Pending.id())
            .bind(TransactionStatus::Paid.id())
            .bind(account_id)
            .bind(actor)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(paid) = paid else {
            tx.rollback().await?;
            return Ok(PayOutcome::NotPending);
        };

        if !apply_to_account(&mut tx, company_id, account_id, paid.kind, paid.amount, actor).await? {
            tx.rollback().await?;
            return Ok(PayOutcome::AccountUnavailable);
        }

        tx.commit().await?;
        Ok(PayOutcome::Paid(paid))
    }

    /// Cancel a pending transaction. Returns `None` if it is not pending.
    pub async fn cancel(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        actor: DbId,
    ) -> Result<Option<FinancialTransaction>, sqlx::Error> {
        let query = format!(
            "UPDATE financial_transactions SET status_id = $4, updated_by = $5
             WHERE company_id = $1 AND id = $2 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FinancialTransaction>(&query)
            .bind(company_id)
            .bind(id)
            .bind(TransactionStatus::Pending.id())
            .bind(TransactionStatus::Cancelled.id())
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Delete a pending transaction. Returns `true` if a row was removed.
    pub async fn delete_pending(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM financial_transactions
             WHERE company_id = $1 AND id = $2 AND status_id = $3",
        )
        .bind(company_id)
        .bind(id)
        .bind(TransactionStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Outstanding payable/receivable totals and overdue figures as of `today`.
    pub async fn summary(
        pool: &PgPool,
        company_id: DbId,
        today: Date,
    ) -> Result<TransactionSummary, sqlx::Error> {
        sqlx::query_as::<_, TransactionSummary>(
            "SELECT
                COALESCE(SUM(amount) FILTER (WHERE kind_id = $2), 0) AS outstanding_payable,
                COALESCE(SUM(amount) FILTER (WHERE kind_id = $3), 0) AS outstanding_receivable,
                COUNT(*) FILTER (WHERE due_date < $5) AS overdue_count,
                COALESCE(SUM(amount) FILTER (WHERE due_date < $5), 0) AS overdue_amount
             FROM financial_transactions
             WHERE company_id = $1 AND status_id = $4",
        )
        .bind(company_id)
        .bind(TransactionKind::Payable.id())
        .bind(TransactionKind::Receivable.id())
        .bind(TransactionStatus::Pending.id())
        .bind(today)
        .fetch_one(pool)
        .await
    }
}
