//! Handlers for the `/transactions` resource (accounts payable and
//! receivable).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use ledgerline_core::finance::is_overdue;
use ledgerline_core::lifecycle::{ensure_transition, TransactionStatus};
use ledgerline_core::pagination::Page;
use ledgerline_core::types::DbId;
use ledgerline_db::models::transaction::{
    CreateTransaction, FinancialTransaction, PayTransaction, TransactionFilter,
    TransactionSummary, UpdateTransaction,
};
use ledgerline_db::repositories::{PayOutcome, TransactionRepo};

use super::{changed_concurrently, require_active_account};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::{OptionalJson, ValidatedJson};
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/transactions
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(filter): Query<TransactionFilter>,
) -> AppResult<ApiResponse<Page<FinancialTransaction>>> {
    let transactions =
        TransactionRepo::list(&state.pool, auth.company_id, &filter, page.to_request()).await?;
    Ok(ApiResponse::ok(transactions))
}

/// GET /api/transactions/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<ApiResponse<TransactionSummary>> {
    let today = Utc::now().date_naive();
    let summary = TransactionRepo::summary(&state.pool, auth.company_id, today).await?;
    Ok(ApiResponse::ok(summary))
}

/// GET /api/transactions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<FinancialTransaction>> {
    let transaction = find(&state, auth.company_id, id).await?;
    Ok(ApiResponse::ok(transaction))
}

/// POST /api/transactions
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateTransaction>,
) -> AppResult<ApiResponse<FinancialTransaction>> {
    if let Some(account_id) = input.account_id {
        require_active_account(&state, auth.company_id, account_id).await?;
    }
    let transaction =
        TransactionRepo::create(&state.pool, auth.company_id, &input, auth.user_id).await?;
    tracing::info!(
        transaction_id = transaction.id,
        kind = transaction.kind.name(),
        amount = %transaction.amount,
        "Transaction recorded"
    );
    Ok(ApiResponse::created(transaction))
}

/// PUT /api/transactions/{id}
///
/// Only pending transactions can be edited.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTransaction>,
) -> AppResult<ApiResponse<FinancialTransaction>> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_pending(&existing, "edited")?;
    if let Some(account_id) = input.account_id {
        require_active_account(&state, auth.company_id, account_id).await?;
    }

    let transaction =
        TransactionRepo::update_pending(&state.pool, auth.company_id, id, &input, auth.user_id)
            .await?
            .ok_or_else(|| changed_concurrently("Transaction"))?;
    Ok(ApiResponse::ok(transaction))
}

/// POST /api/transactions/{id}/pay
///
/// Marks the transaction paid and moves the account balance in the same
/// database transaction: receivables credit, payables debit.
pub async fn pay(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    OptionalJson(input): OptionalJson<PayTransaction>,
) -> AppResult<ApiResponse<FinancialTransaction>> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_transition(existing.status, TransactionStatus::Paid)?;

    let account_id = input
        .account_id
        .or(existing.account_id)
        .ok_or_else(|| AppError::validation("account_id: is required to pay a transaction"))?;
    require_active_account(&state, auth.company_id, account_id).await?;

    match TransactionRepo::pay(&state.pool, auth.company_id, id, account_id, auth.user_id).await? {
        PayOutcome::Paid(transaction) => {
            let today = Utc::now().date_naive();
            tracing::info!(
                transaction_id = id,
                account_id,
                amount = %transaction.amount,
                was_overdue = is_overdue(existing.status, existing.due_date, today),
                "Transaction paid"
            );
            Ok(ApiResponse::ok(transaction))
        }
        PayOutcome::NotPending => Err(changed_concurrently("Transaction")),
        PayOutcome::AccountUnavailable => Err(AppError::business_rule(format!(
            "Account {account_id} is no longer available"
        ))),
    }
}

/// POST /api/transactions/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<FinancialTransaction>> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_transition(existing.status, TransactionStatus::Cancelled)?;

    let transaction = TransactionRepo::cancel(&state.pool, auth.company_id, id, auth.user_id)
        .await?
        .ok_or_else(|| changed_concurrently("Transaction"))?;
    tracing::info!(transaction_id = id, "Transaction cancelled");
    Ok(ApiResponse::ok(transaction))
}

/// DELETE /api/transactions/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find(&state, auth.company_id, id).await?;
    ensure_pending(&existing, "deleted")?;

    if TransactionRepo::delete_pending(&state.pool, auth.company_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(changed_concurrently("Transaction"))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find(state: &AppState, company_id: DbId, id: DbId) -> AppResult<FinancialTransaction> {
    TransactionRepo::find_by_id(&state.pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Transaction", id))
}

fn ensure_pending(transaction: &FinancialTransaction, action: &str) -> AppResult<()> {
    if transaction.status == TransactionStatus::Pending {
        Ok(())
    } else {
        Err(AppError::business_rule(format!(
            "Only pending transactions can be {action} (status is {})",
            transaction.status.name()
        )))
    }
}
