//! Rendered-page cache for the index feed.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use blogroll_core::ports::{Cache, CacheError};

/// Whole-page HTML cache with a fixed TTL.
///
/// Entries are only ever written with a TTL or dropped wholesale by
/// [`PageCache::clear`]; posting does not invalidate them.
#[derive(Clone)]
pub struct PageCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Cache key for a request URI (path and query) as seen by `viewer`.
    ///
    /// The navigation bar differs per signed-in user, so each viewer gets
    /// their own entry; all anonymous visitors share one.
    pub fn key(uri: &str, viewer: Option<Uuid>) -> String {
        match viewer {
            Some(user_id) => format!("page:{user_id}:{uri}"),
            None => format!("page:anon:{uri}"),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).await
    }

    /// Store a rendered page. Failures are logged, never surfaced.
    pub async fn store(&self, key: &str, html: &str) {
        if let Err(e) = self.cache.set(key, html, Some(self.ttl)).await {
            tracing::error!(error = %e, %key, "Failed to cache page");
        }
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        self.cache.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogroll_infra::InMemoryCache;

    #[test]
    fn test_key_separates_viewers_and_queries() {
        let user = Uuid::new_v4();
        assert_eq!(PageCache::key("/", None), "page:anon:/");
        assert_ne!(PageCache::key("/", None), PageCache::key("/?page=2", None));
        assert_ne!(PageCache::key("/", None), PageCache::key("/", Some(user)));
    }

    #[tokio::test]
    async fn test_store_then_clear() {
        let pages = PageCache::new(Arc::new(InMemoryCache::new()), Duration::from_secs(20));
        pages.store("page:anon:/", "<html>").await;
        assert_eq!(pages.get("page:anon:/").await.as_deref(), Some("<html>"));

        pages.clear().await.unwrap();
        assert_eq!(pages.get("page:anon:/").await, None);
    }
}
