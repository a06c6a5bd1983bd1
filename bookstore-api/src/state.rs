//! Application state

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{RateLimiter, TokenService};
use crate::config::Config;
use crate::db::Repositories;
use crate::db::memory::MemoryStore;
use crate::db::postgres::PgStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Repositories over the configured store
    pub repos: Repositories,
    /// Access token signer/verifier (read-only after start-up)
    pub tokens: TokenService,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Build the store named by `DATABASE_URL`, running migrations for PostgreSQL
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let repos = if config.uses_memory_store() {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Repositories::from_store(MemoryStore::new(Duration::from_millis(
                config.order_lock_timeout_ms,
            )))
        } else {
            let store = PgStore::connect(
                &config.database_url,
                config.db_max_connections,
                config.order_lock_timeout_ms,
            )
            .await?;
            tracing::info!("Connected to PostgreSQL");
            Repositories::from_store(store)
        };

        Ok(Self::with_repositories(config.clone(), repos))
    }

    pub fn with_repositories(config: Config, repos: Repositories) -> Self {
        // Configs built in code skip `from_env`; clamp instead of overflowing
        let minutes = config
            .access_token_expire_minutes
            .clamp(1, crate::config::MAX_TOKEN_MINUTES);
        let tokens = TokenService::new(
            &config.jwt_secret,
            config.jwt_algorithm,
            chrono::Duration::minutes(minutes),
        );
        Self {
            config: Arc::new(config),
            repos,
            tokens,
            rate_limiter: RateLimiter::new(),
        }
    }
}
