use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::middleware::permission_cache::PermissionCache;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference counted and everything else is
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: ledgerline_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Compiled role documents used by the permission filter.
    pub permissions: Arc<PermissionCache>,
}

impl AppState {
    pub fn new(pool: ledgerline_db::DbPool, config: ServerConfig) -> Self {
        let ttl = Duration::from_secs(config.permission_cache_ttl_secs);
        Self {
            pool,
            config: Arc::new(config),
            permissions: Arc::new(PermissionCache::new(ttl)),
        }
    }
}
