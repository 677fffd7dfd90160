//! Handlers for the `/accounts` resource (bank and cash accounts).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use ledgerline_core::pagination::Page;
use ledgerline_core::types::DbId;
use ledgerline_db::models::account::{Account, CreateAccount, UpdateAccount};
use ledgerline_db::repositories::AccountRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::query::{ActiveParams, PageParams};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/accounts
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(active): Query<ActiveParams>,
) -> AppResult<ApiResponse<Page<Account>>> {
    let accounts =
        AccountRepo::list(&state.pool, auth.company_id, active.is_active, page.to_request())
            .await?;
    Ok(ApiResponse::ok(accounts))
}

/// GET /api/accounts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Account>> {
    let account = AccountRepo::find_by_id(&state.pool, auth.company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Account", id))?;
    Ok(ApiResponse::ok(account))
}

/// POST /api/accounts
///
/// New accounts start with a zero balance; the balance only moves when a
/// transaction is paid.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateAccount>,
) -> AppResult<ApiResponse<Account>> {
    let account = AccountRepo::create(&state.pool, auth.company_id, &input, auth.user_id).await?;
    tracing::info!(account_id = account.id, company_id = auth.company_id, "Account created");
    Ok(ApiResponse::created(account))
}

/// PUT /api/accounts/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateAccount>,
) -> AppResult<ApiResponse<Account>> {
    let account = AccountRepo::update(&state.pool, auth.company_id, id, &input, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Account", id))?;
    Ok(ApiResponse::ok(account))
}

/// DELETE /api/accounts/{id}
///
/// Accounts with recorded transactions cannot be deleted; deactivate them.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let account = AccountRepo::find_by_id(&state.pool, auth.company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Account", id))?;

    let transactions = AccountRepo::count_transactions(&state.pool, account.id).await?;
    if transactions > 0 {
        return Err(AppError::conflict(format!(
            "Account '{}' has {transactions} transaction(s); deactivate it instead",
            account.name
        )));
    }

    if AccountRepo::delete(&state.pool, auth.company_id, id).await? {
        tracing::info!(account_id = id, company_id = auth.company_id, "Account deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Account", id))
    }
}
