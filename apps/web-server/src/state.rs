//! Application state - shared across all handlers.

use std::sync::Arc;

use tera::Tera;

use blogroll_core::Repositories;
use blogroll_core::ports::{Cache, CacheError, MediaStorage, PasswordService, TokenService};
use blogroll_infra::{
    Argon2PasswordService, InMemoryCache, JwtConfig, JwtTokenService, LocalMediaStorage,
    MemoryDatabase,
};

#[cfg(feature = "postgres")]
use blogroll_infra::DatabaseConnections;
#[cfg(feature = "redis")]
use blogroll_infra::{RedisCache, RedisConfig};

use crate::config::AppConfig;
use crate::page_cache::PageCache;
use crate::templates;

/// Failures that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Template error: {0}")]
    Templates(#[from] tera::Error),

    #[error("Cache unavailable: {0}")]
    Cache(#[from] CacheError),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub page_cache: PageCache,
    pub templates: Arc<Tera>,
    pub media: Arc<dyn MediaStorage>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub posts_per_page: u64,
    /// Storage backend name reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let (repos, storage) = Self::init_repositories(config).await;

        let cache = Self::init_cache(config).await?;
        let page_cache = PageCache::new(cache, config.index_cache_ttl);
        // Pages rendered by a previous build may reference stale markup.
        if let Err(e) = page_cache.clear().await {
            tracing::warn!(error = %e, "Could not clear page cache on startup");
        }

        let media = Arc::new(LocalMediaStorage::new(
            config.media_root.clone(),
            config.media_url.clone(),
        ));

        let state = Self {
            repos,
            page_cache,
            templates: Arc::new(templates::load()?),
            media,
            tokens: Arc::new(JwtTokenService::new(JwtConfig::from_env())),
            passwords: Arc::new(Argon2PasswordService::new()),
            posts_per_page: config.posts_per_page,
            storage,
        };

        tracing::info!(storage, "Application state initialized");
        Ok(state)
    }

    #[cfg(feature = "postgres")]
    async fn init_repositories(config: &AppConfig) -> (Repositories, &'static str) {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (MemoryDatabase::new().repositories(), "memory");
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => (connections.repositories(), "postgres"),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (MemoryDatabase::new().repositories(), "memory")
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_repositories(_config: &AppConfig) -> (Repositories, &'static str) {
        tracing::info!("Running without postgres feature - using in-memory repository");
        (MemoryDatabase::new().repositories(), "memory")
    }

    #[cfg(feature = "redis")]
    async fn init_cache(config: &AppConfig) -> Result<Arc<dyn Cache>, CacheError> {
        let Some(url) = &config.redis_url else {
            return Ok(Arc::new(InMemoryCache::new()));
        };

        let redis_config = RedisConfig::from_env(url.clone());
        match RedisCache::new(&redis_config).await {
            Ok(cache) => Ok(Arc::new(cache)),
            Err(e) if redis_config.fallback_to_memory => {
                tracing::warn!("Redis unavailable: {}. Using in-memory page cache.", e);
                Ok(Arc::new(InMemoryCache::new()))
            }
            Err(e) => {
                tracing::error!("Redis unavailable: {}", e);
                Err(e)
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn init_cache(config: &AppConfig) -> Result<Arc<dyn Cache>, CacheError> {
        if config.redis_url.is_some() {
            tracing::warn!("REDIS_URL set but the redis feature is disabled");
        }
        Ok(Arc::new(InMemoryCache::new()))
    }
}
