//! Repository for the `accounts` table.

use sqlx::PgPool;
use ledgerline_core::pagination::{Page, PageRequest};
use ledgerline_core::types::DbId;

use crate::models::account::{Account, CreateAccount, UpdateAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, name, account_type, currency, balance, is_active, \
                       created_by, updated_by, created_at, updated_at";

/// Provides CRUD operations for accounts. Balances are adjusted by
/// [`TransactionRepo::pay`](crate::repositories::TransactionRepo::pay) only.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account with a zero balance.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateAccount,
        actor: DbId,
    ) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (company_id, name, account_type, currency, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(company_id)
            .bind(input.name.trim())
            .bind(input.account_type.trim())
            .bind(&input.currency)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find an account by ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE company_id = $1 AND id = $2");
        sqlx::query_as::<_, Account>(&query)
            .bind(company_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List accounts by name, optionally only active ones.
    pub async fn list(
        pool: &PgPool,
        company_id: DbId,
        is_active: Option<bool>,
        page: PageRequest,
    ) -> Result<Page<Account>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM accounts
             WHERE company_id = $1 AND ($2::BOOLEAN IS NULL OR is_active = $2)",
        )
        .bind(company_id)
        .bind(is_active)
        .fetch_one(pool)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM accounts
             WHERE company_id = $1 AND ($2::BOOLEAN IS NULL OR is_active = $2)
             ORDER BY name ASC, id ASC
             LIMIT $3 OFFSET $4"
        );
        let items = sqlx::query_as::<_, Account>(&query)
            .bind(company_id)
            .bind(is_active)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page::new(items, page, total))
    }

    /// Update an account. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateAccount,
        actor: DbId,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET
                name = COALESCE($3, name),
                account_type = COALESCE($4, account_type),
                is_active = COALESCE($5, is_active),
                updated_by = $6
             WHERE company_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(company_id)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.account_type.as_deref().map(str::trim))
            .bind(input.is_active)
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Number of transactions linked to the account, in any status.
    pub async fn count_transactions(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM financial_transactions WHERE account_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Permanently delete an account. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, company_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
