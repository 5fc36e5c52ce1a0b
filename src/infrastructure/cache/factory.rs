//! Completion cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::CompletionCache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCacheConfig, InMemoryCompletionCache};
use super::redis::{RedisCacheConfig, RedisCompletionCache};

/// Supported completion cache backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionCacheType {
    /// In-memory cache using moka
    #[default]
    InMemory,
    /// Redis cache shared between processes
    Redis,
}

impl std::fmt::Display for CompletionCacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionCacheType::InMemory => write!(f, "in_memory"),
            CompletionCacheType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for CompletionCacheType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(CompletionCacheType::InMemory),
            "redis" => Ok(CompletionCacheType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown completion cache backend: {}. Valid backends: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for the completion cache factory
#[derive(Debug, Clone)]
pub struct CompletionCacheConfig {
    pub backend: CompletionCacheType,
    /// Required for the Redis backend
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    /// In-memory only
    pub max_capacity: Option<u64>,
    /// Completions never expire when unset
    pub time_to_live: Option<Duration>,
}

impl Default for CompletionCacheConfig {
    fn default() -> Self {
        Self {
            backend: CompletionCacheType::InMemory,
            redis_url: None,
            key_prefix: None,
            max_capacity: Some(10_000),
            time_to_live: None,
        }
    }
}

impl CompletionCacheConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: CompletionCacheType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }
}

/// Factory for completion cache instances
#[derive(Debug, Default)]
pub struct CompletionCacheFactory;

impl CompletionCacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a completion cache based on configuration
    pub async fn create(
        &self,
        config: &CompletionCacheConfig,
    ) -> Result<Arc<dyn CompletionCache>, DomainError> {
        match config.backend {
            CompletionCacheType::InMemory => {
                let mut in_memory_config = InMemoryCacheConfig::default();

                if let Some(capacity) = config.max_capacity {
                    in_memory_config = in_memory_config.with_max_capacity(capacity);
                }

                if let Some(ttl) = config.time_to_live {
                    in_memory_config = in_memory_config.with_time_to_live(ttl);
                }

                Ok(Arc::new(InMemoryCompletionCache::with_config(
                    in_memory_config,
                )))
            }
            CompletionCacheType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration(
                        "Redis URL is required for the redis completion cache backend",
                    )
                })?;

                let mut redis_config = RedisCacheConfig::new(url);

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                if let Some(ttl) = config.time_to_live {
                    redis_config = redis_config.with_time_to_live(ttl);
                }

                Ok(Arc::new(RedisCompletionCache::new(redis_config).await?))
            }
        }
    }

    /// Creates an in-memory cache with default settings
    pub fn create_in_memory(&self) -> Arc<dyn CompletionCache> {
        Arc::new(InMemoryCompletionCache::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CachedCompletion, CompletionCacheExt, CompletionKey};

    #[test]
    fn test_cache_type_from_str() {
        assert_eq!(
            "in_memory".parse::<CompletionCacheType>().unwrap(),
            CompletionCacheType::InMemory
        );
        assert_eq!(
            "memory".parse::<CompletionCacheType>().unwrap(),
            CompletionCacheType::InMemory
        );
        assert_eq!(
            "REDIS".parse::<CompletionCacheType>().unwrap(),
            CompletionCacheType::Redis
        );
        assert!("memcached".parse::<CompletionCacheType>().is_err());
    }

    #[test]
    fn test_cache_type_display() {
        assert_eq!(CompletionCacheType::InMemory.to_string(), "in_memory");
        assert_eq!(CompletionCacheType::Redis.to_string(), "redis");
    }

    #[test]
    fn test_config_builders() {
        let config = CompletionCacheConfig::redis("redis://localhost:6379")
            .with_key_prefix("convince")
            .with_time_to_live(Duration::from_secs(600));

        assert_eq!(config.backend, CompletionCacheType::Redis);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.key_prefix.as_deref(), Some("convince"));
        assert_eq!(config.time_to_live, Some(Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn test_factory_create_in_memory() {
        let factory = CompletionCacheFactory::new();
        let cache = factory
            .create(&CompletionCacheConfig::in_memory().with_max_capacity(10))
            .await
            .unwrap();

        let key = CompletionKey::new("llm", "query", None);
        cache
            .put(&CachedCompletion::new(&key, "req-1", "answer"))
            .await
            .unwrap();

        let cached = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(cached.completion, "answer");
    }

    #[tokio::test]
    async fn test_factory_redis_requires_url() {
        let config = CompletionCacheConfig {
            backend: CompletionCacheType::Redis,
            redis_url: None,
            ..Default::default()
        };

        let result = CompletionCacheFactory::new().create(&config).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
