//! Handlers for the `/roles` resource.
//!
//! System roles are listed alongside the company's custom roles but can only
//! be read. Any write to a role drops its compiled permissions from the cache.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use ledgerline_core::permissions::modules::{ModuleInfo, MODULES};
use ledgerline_core::permissions::{Capability, RolePermissions};
use ledgerline_core::roles::is_reserved_name;
use ledgerline_core::types::DbId;
use ledgerline_db::models::role::{CreateRole, Role, UpdateRole};
use ledgerline_db::repositories::RoleRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::validated_json::ValidatedJson;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Module catalogue served to role editors.
#[derive(Debug, Serialize)]
pub struct ModuleCatalogue {
    pub modules: &'static [ModuleInfo],
    pub capabilities: [Capability; 5],
}

/// GET /api/roles
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<ApiResponse<Vec<Role>>> {
    let roles = RoleRepo::list_visible(&state.pool, auth.company_id).await?;
    Ok(ApiResponse::ok(roles))
}

/// GET /api/roles/modules
pub async fn modules() -> ApiResponse<ModuleCatalogue> {
    ApiResponse::ok(ModuleCatalogue {
        modules: MODULES,
        capabilities: Capability::ALL,
    })
}

/// GET /api/roles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<ApiResponse<Role>> {
    let role = find_visible(&state, auth.company_id, id).await?;
    Ok(ApiResponse::ok(role))
}

/// POST /api/roles
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateRole>,
) -> AppResult<ApiResponse<Role>> {
    ensure_custom_name(&input.name)?;
    ensure_valid_document(&input.permissions)?;

    let role = RoleRepo::create(&state.pool, auth.company_id, &input, auth.user_id).await?;
    tracing::info!(role_id = role.id, role = %role.name, "Custom role created");
    Ok(ApiResponse::created(role))
}

/// PUT /api/roles/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateRole>,
) -> AppResult<ApiResponse<Role>> {
    let existing = find_visible(&state, auth.company_id, id).await?;
    ensure_editable(&existing)?;
    if let Some(name) = &input.name {
        ensure_custom_name(name)?;
    }
    if let Some(document) = &input.permissions {
        ensure_valid_document(document)?;
    }

    let role = RoleRepo::update(&state.pool, auth.company_id, id, &input, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Role", id))?;
    state.permissions.invalidate(id).await;

    Ok(ApiResponse::ok(role))
}

/// DELETE /api/roles/{id}
///
/// Fails with 409 while users are still assigned to the role.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_visible(&state, auth.company_id, id).await?;
    ensure_editable(&existing)?;

    let assigned = RoleRepo::count_users(&state.pool, id).await?;
    if assigned > 0 {
        return Err(AppError::conflict(format!(
            "Role '{}' is assigned to {assigned} user(s)",
            existing.name
        )));
    }

    if !RoleRepo::delete(&state.pool, auth.company_id, id).await? {
        return Err(AppError::not_found("Role", id));
    }
    state.permissions.invalidate(id).await;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_visible(state: &AppState, company_id: DbId, id: DbId) -> AppResult<Role> {
    RoleRepo::find_visible(&state.pool, company_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Role", id))
}

fn ensure_editable(role: &Role) -> AppResult<()> {
    if role.is_system {
        return Err(AppError::business_rule(format!(
            "System role '{}' is read-only",
            role.name
        )));
    }
    Ok(())
}

fn ensure_custom_name(name: &str) -> AppResult<()> {
    if is_reserved_name(name) {
        return Err(AppError::conflict(format!(
            "'{}' is reserved for a system role",
            name.trim()
        )));
    }
    Ok(())
}

fn ensure_valid_document(document: &RolePermissions) -> AppResult<()> {
    let problems = document.problems();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "permissions: {}",
            problems.join("; ")
        )))
    }
}
