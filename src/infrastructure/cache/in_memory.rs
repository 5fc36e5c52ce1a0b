//! In-memory completion cache using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::cache::CompletionCache;
use crate::domain::DomainError;

/// Configuration for the in-memory completion cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Entries live forever when unset
    pub time_to_live: Option<Duration>,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            time_to_live: None,
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }
}

/// Thread-safe, capacity-bounded completion cache
#[derive(Debug)]
pub struct InMemoryCompletionCache {
    cache: MokaCache<String, String>,
}

impl InMemoryCompletionCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let mut builder = MokaCache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.time_to_live {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
        }
    }
}

impl Default for InMemoryCompletionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionCache for InMemoryCompletionCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.cache.get(key).await)
    }

    async fn set_nx_raw(&self, key: &str, value: &str) -> Result<bool, DomainError> {
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert(value.to_string())
            .await;

        Ok(entry.is_fresh())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count() as usize)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CachedCompletion, CompletionCacheExt, CompletionKey};

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = InMemoryCompletionCache::new();
        let key = CompletionKey::new("llm", "Sell 10y SOFR swap", None);

        assert!(cache.get(&key).await.unwrap().is_none());

        cache
            .put(&CachedCompletion::new(&key, "req-1", "3.45%"))
            .await
            .unwrap();

        let cached = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(cached.completion, "3.45%");
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_first_write_wins() {
        let cache = InMemoryCompletionCache::new();

        assert!(cache.set_nx_raw("k", "first").await.unwrap());
        assert!(!cache.set_nx_raw("k", "second").await.unwrap());
        assert_eq!(cache.get_raw("k").await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = InMemoryCompletionCache::new();
        cache.set_nx_raw("a", "1").await.unwrap();
        cache.set_nx_raw("b", "2").await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get_raw("a").await.unwrap().is_none());
        assert!(cache.get_raw("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_time_to_live() {
        let cache = InMemoryCompletionCache::with_config(
            InMemoryCacheConfig::default().with_time_to_live(Duration::from_millis(50)),
        );
        cache.set_nx_raw("k", "v").await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get_raw("k").await.unwrap().is_none());
    }
}
