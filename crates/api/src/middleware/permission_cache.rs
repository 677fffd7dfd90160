//! Time-bounded cache of compiled role permission documents.
//!
//! The permission filter runs on every protected request; compiling a role's
//! JSON document each time would mean a database round trip plus pattern
//! parsing. Entries expire after the configured TTL and are dropped eagerly
//! when a role is updated or deleted through the API.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ledgerline_core::permissions::{CompiledPermissions, RoleScope};
use ledgerline_core::types::DbId;
use ledgerline_db::models::role::Role;
use tokio::sync::RwLock;

/// What the permission filter needs to know about a role.
#[derive(Debug, Clone)]
pub struct CachedRole {
    /// `None` for system roles.
    pub company_id: Option<DbId>,
    pub name: String,
    /// `None` when the stored document is malformed; such a role is denied
    /// everything except the administrator bypass.
    pub permissions: Option<CompiledPermissions>,
}

impl CachedRole {
    pub fn from_role(role: &Role) -> Self {
        let permissions = match role.permission_document() {
            Some(document) => {
                let problems = document.problems();
                if !problems.is_empty() {
                    tracing::warn!(
                        role_id = role.id,
                        role = %role.name,
                        ?problems,
                        "Role permissions contain invalid entries; they will never match",
                    );
                }
                Some(document.compile())
            }
            None => {
                tracing::warn!(
                    role_id = role.id,
                    role = %role.name,
                    "Role permissions document is malformed; denying all requests",
                );
                None
            }
        };

        Self {
            company_id: role.company_id,
            name: role.name.clone(),
            permissions,
        }
    }

    pub fn scope(&self) -> RoleScope {
        match self.company_id {
            Some(_) => RoleScope::Company,
            None => RoleScope::System,
        }
    }

    /// A role is usable by a company if it is a system role or belongs to it.
    pub fn is_visible_to(&self, company_id: DbId) -> bool {
        match self.company_id {
            Some(owner) => owner == company_id,
            None => true,
        }
    }
}

struct Entry {
    loaded_at: Instant,
    role: Arc<CachedRole>,
}

pub struct PermissionCache {
    ttl: Duration,
    entries: RwLock<HashMap<DbId, Entry>>,
}

impl PermissionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return a cached role if present and not expired.
    pub async fn get(&self, role_id: DbId) -> Option<Arc<CachedRole>> {
        let entries = self.entries.read().await;
        entries
            .get(&role_id)
            .filter(|entry| entry.loaded_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.role))
    }

    pub async fn insert(&self, role_id: DbId, role: CachedRole) -> Arc<CachedRole> {
        let role = Arc::new(role);
        self.entries.write().await.insert(
            role_id,
            Entry {
                loaded_at: Instant::now(),
                role: Arc::clone(&role),
            },
        );
        role
    }

    pub async fn invalidate(&self, role_id: DbId) {
        if self.entries.write().await.remove(&role_id).is_some() {
            tracing::debug!(role_id, "Permission cache entry invalidated");
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
