//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use ledgerline_core::error::CoreError;
use ledgerline_core::types::DbId;

use crate::auth::jwt::{validate_token, Claims, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from a JWT Bearer token.
///
/// On routes behind the permission filter the filter has already verified
/// the token and stored the `AuthUser` in request extensions; the extractor
/// reuses it. On the few authenticated routes outside the filter
/// (`/auth/me`, `/auth/logout`) the token is validated here.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The caller's company; every tenant-owned query is scoped by it.
    pub company_id: DbId,
    /// The user's role name (e.g. `"admin"`, `"accountant"`).
    pub role: String,
    pub role_id: DbId,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            company_id: claims.cid,
            role: claims.role,
            role_id: claims.role_id,
        }
    }
}

/// Validate the `Authorization: Bearer <token>` header.
pub fn authenticate(headers: &HeaderMap, config: &JwtConfig) -> Result<Claims, AppError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })?;

    validate_token(token.trim(), config)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let claims = authenticate(&parts.headers, &state.config.jwt)?;
        Ok(claims.into())
    }
}
