//! Cache domain - completion cache keys and storage contract

mod key;
mod repository;

pub use key::{normalize_query, CachedCompletion, CompletionKey, COMPLETION_NAMESPACE};
pub use repository::{CompletionCache, CompletionCacheExt};

#[cfg(test)]
pub use repository::mock::MockCompletionCache;
