//! Handlers for the `/users` resource (logins of the caller's company).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use ledgerline_core::pagination::Page;
use ledgerline_core::types::DbId;
use ledgerline_db::models::user::{CreateUser, UpdateUser, UserFilter, UserResponse};
use ledgerline_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::query::PageParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    pub password: String,
    pub role_id: DbId,
}

/// Request body for `POST /users/{id}/reset-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
    Query(filter): Query<UserFilter>,
) -> AppResult<ApiResponse<Page<UserResponse>>> {
    let users = UserRepo::list(&state.pool, auth.company_id, &filter, page.to_request()).await?;
    Ok(ApiResponse::ok(users))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = find_response(&state, auth.company_id, id).await?;
    Ok(ApiResponse::ok(user))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::validation)?;
    ensure_role_visible(&state, auth.company_id, input.role_id).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        company_id: auth.company_id,
        role_id: input.role_id,
        username: input.username,
        email: input.email,
        password_hash,
    };
    let user = UserRepo::create(&state.pool, &create_dto, auth.user_id).await?;
    tracing::info!(user_id = user.id, created_by = auth.user_id, "User created");

    let response = find_response(&state, auth.company_id, user.id).await?;
    Ok(ApiResponse::created(response))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> AppResult<ApiResponse<UserResponse>> {
    if let Some(role_id) = input.role_id {
        ensure_role_visible(&state, auth.company_id, role_id).await?;
    }
    if id == auth.user_id && input.is_active == Some(false) {
        return Err(AppError::business_rule("You cannot deactivate your own account"));
    }

    UserRepo::update(&state.pool, auth.company_id, id, &input, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    let response = find_response(&state, auth.company_id, id).await?;
    Ok(ApiResponse::ok(response))
}

/// DELETE /api/users/{id}
///
/// Soft-deactivate a user and revoke their sessions. Returns 204 No Content.
pub async fn deactivate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == auth.user_id {
        return Err(AppError::business_rule("You cannot deactivate your own account"));
    }
    if !UserRepo::deactivate(&state.pool, auth.company_id, id, auth.user_id).await? {
        return Err(AppError::not_found("User", id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, deactivated_by = auth.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/{id}/reset-password
///
/// Set a new password, clear any lockout and sign the user out everywhere.
pub async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::validation)?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, auth.company_id, id, &hashed, auth.user_id).await? {
        return Err(AppError::not_found("User", id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_response(state: &AppState, company_id: DbId, id: DbId) -> AppResult<UserResponse> {
    UserRepo::find_response(&state.pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

async fn ensure_role_visible(state: &AppState, company_id: DbId, role_id: DbId) -> AppResult<()> {
    RoleRepo::find_visible(&state.pool, company_id, role_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation(format!("role_id: role {role_id} not found")))
}
