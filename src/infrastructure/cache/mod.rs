//! Completion cache implementations

mod factory;
mod in_memory;
mod redis;

pub use factory::{CompletionCacheConfig, CompletionCacheFactory, CompletionCacheType};
pub use in_memory::{InMemoryCacheConfig, InMemoryCompletionCache};
pub use redis::{RedisCacheConfig, RedisCompletionCache};
