//! Handlers for the caller's own company profile.

use axum::extract::State;
use ledgerline_db::models::company::{Company, UpdateCompany};
use ledgerline_db::repositories::CompanyRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/companies/current
pub async fn get_current(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<ApiResponse<Company>> {
    let company = CompanyRepo::find_by_id(&state.pool, auth.company_id)
        .await?
        .ok_or_else(|| AppError::not_found("Company", auth.company_id))?;
    Ok(ApiResponse::ok(company))
}

/// PUT /api/companies/current
pub async fn update_current(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateCompany>,
) -> AppResult<ApiResponse<Company>> {
    let company = CompanyRepo::update(&state.pool, auth.company_id, &input, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Company", auth.company_id))?;
    Ok(ApiResponse::ok(company))
}
