//! Per-request permission filter.
//!
//! Mounted as a `route_layer` over every protected `/api` route. It
//! authenticates the bearer token, loads the caller's role (through
//! [`PermissionCache`](super::permission_cache::PermissionCache)), asks
//! [`evaluate`] for a decision and either rejects with 403 or hands an
//! [`AuthUser`] to the handler via request extensions.

use std::sync::Arc;

use axum::extract::{OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use ledgerline_core::error::CoreError;
use ledgerline_core::permissions::{evaluate, Decision, DenyReason};
use ledgerline_core::types::DbId;
use ledgerline_db::repositories::RoleRepo;

use super::auth::{authenticate, AuthUser};
use super::permission_cache::CachedRole;
use crate::error::AppError;
use crate::state::AppState;

pub async fn enforce(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = authenticate(request.headers(), &state.config.jwt)?;

    // Nested routers see a stripped URI; patterns are written against the full path.
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let method = request.method().as_str().to_owned();

    let role = resolve_role(&state, claims.cid, claims.role_id).await?;
    let decision = match &role {
        Some(role) => evaluate(
            &role.name,
            role.scope(),
            role.permissions.as_ref(),
            &method,
            &path,
        ),
        None => Decision::Deny(DenyReason::NoPermissionData),
    };

    if !decision.is_allowed() {
        tracing::warn!(
            user_id = claims.sub,
            company_id = claims.cid,
            role_id = claims.role_id,
            %method,
            %path,
            %decision,
            "Permission denied",
        );
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have permission to perform this action".into(),
        )));
    }

    tracing::debug!(user_id = claims.sub, %method, %path, %decision, "Permission granted");

    let mut user = AuthUser::from(claims);
    if let Some(role) = role {
        // The role may have been renamed since the token was issued.
        user.role.clone_from(&role.name);
    }
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Load the caller's role, from cache when fresh.
///
/// Returns `None` when the role no longer exists or belongs to another company.
async fn resolve_role(
    state: &AppState,
    company_id: DbId,
    role_id: DbId,
) -> Result<Option<Arc<CachedRole>>, AppError> {
    let role = match state.permissions.get(role_id).await {
        Some(role) => role,
        None => {
            let Some(row) = RoleRepo::find_visible(&state.pool, company_id, role_id).await? else {
                return Ok(None);
            };
            state
                .permissions
                .insert(role_id, CachedRole::from_role(&row))
                .await
        }
    };
    Ok(role.is_visible_to(company_id).then_some(role))
}
