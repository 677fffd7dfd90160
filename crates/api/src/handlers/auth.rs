//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use ledgerline_core::error::CoreError;
use ledgerline_core::permissions::RolePermissions;
use ledgerline_core::types::DbId;
use ledgerline_db::models::company::{Company, CreateCompany};
use ledgerline_db::models::session::CreateSession;
use ledgerline_db::models::user::{User, UserResponse};
use ledgerline_db::repositories::{
    CompanyRepo, EmployeeRepo, NewAdmin, RoleRepo, SessionRepo, UserRepo,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, hash_refresh_token, TokenSubject,
};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(nested)]
    pub company: CreateCompany,
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Successful authentication response returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub company_id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub role_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub company: Company,
    #[serde(flatten)]
    pub auth: AuthResponse,
}

/// Response of `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    /// The role's permission document; `None` if it is malformed.
    pub permissions: Option<RolePermissions>,
    /// Employee record linked to this login, if any.
    pub employee_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create a company together with its first administrator and sign them in.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::validation)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let admin = NewAdmin {
        username: input.username,
        email: input.email,
        password_hash,
    };
    let (company, user) = CompanyRepo::register(&state.pool, &input.company, &admin).await?;
    tracing::info!(company_id = company.id, user_id = user.id, "Company registered");

    let role = role_name(&state, &user).await?;
    let auth = start_session(&state, &headers, &user, &role).await?;

    Ok(ApiResponse::created(RegisterResponse { company, auth }))
}

/// POST /api/auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after failed logins");
        }
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let role = role_name(&state, &user).await?;
    let response = start_session(&state, &headers, &user, &role).await?;
    tracing::info!(user_id = user.id, company_id = user.company_id, "User logged in");

    Ok(ApiResponse::ok(response))
}

/// POST /api/auth/refresh
///
/// Exchange a refresh token for a new token pair. The old session is revoked
/// in the same database transaction that creates the new one, so a token can
/// be redeemed once.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(invalid_refresh_token)?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role = role_name(&state, &user).await?;
    let (response, replacement) = issue_tokens(&state, &headers, &user, &role)?;

    if SessionRepo::rotate(&state.pool, session.id, &replacement)
        .await?
        .is_none()
    {
        tracing::warn!(user_id = user.id, session_id = session.id, "Refresh token replayed");
        return Err(invalid_refresh_token());
    }

    Ok(ApiResponse::ok(response))
}

/// POST /api/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<ApiResponse<MeResponse>> {
    let user = UserRepo::find_response(&state.pool, auth_user.company_id, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let permissions = RoleRepo::find_visible(&state.pool, user.company_id, user.role_id)
        .await?
        .and_then(|role| role.permission_document());

    let employee_id = EmployeeRepo::find_by_user(&state.pool, user.company_id, user.id)
        .await?
        .map(|e| e.id);

    Ok(ApiResponse::ok(MeResponse {
        user,
        permissions,
        employee_id,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

fn invalid_refresh_token() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid or expired refresh token".into(),
    ))
}

async fn role_name(state: &AppState, user: &User) -> AppResult<String> {
    RoleRepo::find_visible(&state.pool, user.company_id, user.role_id)
        .await?
        .map(|role| role.name)
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "User {} references missing role {}",
                user.id, user.role_id
            ))
        })
}

/// Generate an access + refresh token pair and the session row to persist.
fn issue_tokens(
    state: &AppState,
    headers: &HeaderMap,
    user: &User,
    role: &str,
) -> AppResult<(AuthResponse, CreateSession)> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(
        TokenSubject {
            user_id: user.id,
            company_id: user.company_id,
            role,
            role_id: user.role_id,
        },
        jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let session = CreateSession {
        user_id: user.id,
        refresh_token_hash: refresh_hash,
        expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.chars().take(500).collect()),
        ip_address: None,
    };

    let response = AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        token_type: "Bearer",
        expires_in: jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: user.id,
            company_id: user.company_id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: role.to_string(),
            role_id: user.role_id,
        },
    };

    Ok((response, session))
}

/// Issue tokens and persist a fresh session.
async fn start_session(
    state: &AppState,
    headers: &HeaderMap,
    user: &User,
    role: &str,
) -> AppResult<AuthResponse> {
    let (response, session) = issue_tokens(state, headers, user, role)?;
    SessionRepo::create(&state.pool, &session).await?;
    Ok(response)
}
