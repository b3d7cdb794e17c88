//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "postgres")]
use blogroll_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub redis_url: Option<String>,
    pub posts_per_page: u64,
    pub index_cache_ttl: Duration,
    pub media_root: PathBuf,
    pub media_url: String,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|main_url| DatabaseConfig {
            main_url,
            main_max_connections: parsed("DB_MAX_CONNECTIONS", 100),
            main_min_connections: parsed("DB_MIN_CONNECTIONS", 10),
        });

        let media_url = env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string());

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            #[cfg(feature = "postgres")]
            database,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            posts_per_page: parsed("POSTS_PER_PAGE", 10u64).max(1),
            index_cache_ttl: Duration::from_secs(parsed("INDEX_CACHE_TTL_SECS", 20)),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            media_url: media_url.trim_end_matches('/').to_string(),
        }
    }
}
