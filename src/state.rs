//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenKeys;
use crate::config::AppConfig;
use crate::database::{
    MemoryProductStore, MemoryUserStore, PgProductStore, PgUserStore, ProductStore, UserStore,
};

/// Everything a handler may touch, injected at router construction.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenKeys>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            products,
            users,
            tokens: Arc::new(TokenKeys::from_config(&config.security)),
            config: Arc::new(config),
        }
    }

    /// State backed by the Postgres document tables.
    pub fn postgres(pool: PgPool, config: AppConfig) -> Self {
        Self::new(
            Arc::new(PgProductStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool)),
            config,
        )
    }

    /// State backed by process-local stores; nothing survives a restart.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            Arc::new(MemoryProductStore::new()),
            Arc::new(MemoryUserStore::new()),
            config,
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("environment", &self.config.environment)
            .finish_non_exhaustive()
    }
}
