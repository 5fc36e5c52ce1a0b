//! Completion cache trait definition

use std::fmt::Debug;
use std::future::Future;

use async_trait::async_trait;

use super::key::{CachedCompletion, CompletionKey};
use crate::domain::DomainError;

/// Store of completions addressed by hashed key
///
/// Values are JSON strings to keep the trait dyn-compatible; use
/// [`CompletionCacheExt`] for typed access.
#[async_trait]
pub trait CompletionCache: Send + Sync + Debug {
    /// Gets the raw JSON value stored under a key
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores a value unless the key already holds one, returns true if stored
    async fn set_nx_raw(&self, key: &str, value: &str) -> Result<bool, DomainError>;

    /// Number of cached completions
    async fn len(&self) -> Result<usize, DomainError>;

    /// Removes every cached completion
    async fn clear(&self) -> Result<(), DomainError>;
}

/// Typed completion cache operations
pub trait CompletionCacheExt: CompletionCache {
    /// Looks up the completion for a key
    fn get<'a>(
        &'a self,
        key: &'a CompletionKey,
    ) -> impl Future<Output = Result<Option<CachedCompletion>, DomainError>> + Send {
        async move {
            match self.get_raw(&key.cache_key()).await? {
                Some(data) => {
                    let cached: CachedCompletion = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cached completion: {}", e))
                    })?;
                    Ok(Some(cached))
                }
                None => Ok(None),
            }
        }
    }

    /// Stores a completion; the first value written for a key wins
    fn put<'a>(
        &'a self,
        entry: &'a CachedCompletion,
    ) -> impl Future<Output = Result<bool, DomainError>> + Send {
        async move {
            let data = serde_json::to_string(entry).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cached completion: {}", e))
            })?;
            self.set_nx_raw(&entry.key().cache_key(), &data).await
        }
    }
}

// Blanket implementation for all types implementing CompletionCache
impl<T: CompletionCache + ?Sized> CompletionCacheExt for T {}
