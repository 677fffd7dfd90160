//! Handlers for the `/contracts` resource and its lifecycle actions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use ledgerline_core::lifecycle::{ensure_transition, ContractStatus};
use ledgerline_core::pagination::Page;
use ledgerline_core::types::{Date, DbId};
use ledgerline_core::validation::date_range;
use ledgerline_db::models::contract::{
    Contract, ContractFilter, CreateContract, TerminateContract, UpdateContract,
};
use ledgerline_db::repositories::ContractRepo;

use super::{changed_concurrently, require_employee};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::{OptionalJson, ValidatedJson};
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/contracts
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(filter): Query<ContractFilter>,
) -> AppResult<ApiResponse<Page<Contract>>> {
    let contracts =
        ContractRepo::list(&state.pool, auth.company_id, &filter, page.to_request()).await?;
    Ok(ApiResponse::ok(contracts))
}

/// GET /api/contracts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Contract>> {
    let contract = find(&state, auth.company_id, id).await?;
    Ok(ApiResponse::ok(contract))
}

/// POST /api/contracts
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateContract>,
) -> AppResult<ApiResponse<Contract>> {
    date_range(input.start_date, input.end_date, "contract").map_err(AppError::validation)?;
    if let Some(employee_id) = input.employee_id {
        require_employee(&state, auth.company_id, employee_id, "employee_id").await?;
    }

    let contract = ContractRepo::create(&state.pool, auth.company_id, &input, auth.user_id).await?;
    tracing::info!(contract_id = contract.id, company_id = auth.company_id, "Contract created");
    Ok(ApiResponse::created(contract))
}

/// PUT /api/contracts/{id}
///
/// Expired and terminated contracts are read-only.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateContract>,
) -> AppResult<ApiResponse<Contract>> {
    let existing = find(&state, auth.company_id, id).await?;
    if matches!(
        existing.status,
        ContractStatus::Expired | ContractStatus::Terminated
    ) {
        return Err(AppError::business_rule(format!(
            "A {} contract cannot be edited",
            existing.status.name()
        )));
    }

    date_range(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.or(existing.end_date),
        "contract",
    )
    .map_err(AppError::validation)?;
    if let Some(employee_id) = input.employee_id {
        require_employee(&state, auth.company_id, employee_id, "employee_id").await?;
    }

    let contract = ContractRepo::update(&state.pool, auth.company_id, id, &input, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Contract", id))?;
    Ok(ApiResponse::ok(contract))
}

/// POST /api/contracts/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Contract>> {
    let contract = transition(&state, &auth, id, ContractStatus::Active, None).await?;
    Ok(ApiResponse::ok(contract))
}

/// POST /api/contracts/{id}/terminate
///
/// The end date defaults to today and may not precede the start date.
pub async fn terminate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    OptionalJson(input): OptionalJson<TerminateContract>,
) -> AppResult<ApiResponse<Contract>> {
    let end_date = input.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let contract =
        transition(&state, &auth, id, ContractStatus::Terminated, Some(end_date)).await?;
    Ok(ApiResponse::ok(contract))
}

/// POST /api/contracts/{id}/expire
pub async fn expire(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Contract>> {
    let contract = transition(&state, &auth, id, ContractStatus::Expired, None).await?;
    Ok(ApiResponse::ok(contract))
}

/// DELETE /api/contracts/{id}
///
/// Only drafts can be deleted; later contracts stay as history.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find(&state, auth.company_id, id).await?;
    if existing.status != ContractStatus::Draft {
        return Err(AppError::business_rule(format!(
            "Only draft contracts can be deleted (status is {})",
            existing.status.name()
        )));
    }

    if ContractRepo::delete(&state.pool, auth.company_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Contract", id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find(state: &AppState, company_id: DbId, id: DbId) -> AppResult<Contract> {
    ContractRepo::find_by_id(&state.pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Contract", id))
}

async fn transition(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
    to: ContractStatus,
    end_date: Option<Date>,
) -> AppResult<Contract> {
    let existing = find(state, auth.company_id, id).await?;
    ensure_transition(existing.status, to)?;
    if let Some(end) = end_date {
        date_range(existing.start_date, Some(end), "contract").map_err(AppError::validation)?;
    }

    let contract = ContractRepo::transition(
        &state.pool,
        auth.company_id,
        id,
        existing.status,
        to,
        end_date,
        auth.user_id,
    )
    .await?
    .ok_or_else(|| changed_concurrently("Contract"))?;

    tracing::info!(
        contract_id = id,
        from = existing.status.name(),
        to = to.name(),
        "Contract status changed"
    );
    Ok(contract)
}
