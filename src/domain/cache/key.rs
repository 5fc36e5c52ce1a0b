//! Completion cache keys

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Namespace prefix of completion cache keys
pub const COMPLETION_NAMESPACE: &str = "completion";

/// Normalize line endings to LF and trim surrounding whitespace
pub fn normalize_query(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Lookup key of a cached completion
///
/// Two queries that differ only in line endings or surrounding whitespace map to
/// the same key. The request id of the call that produced a completion is not
/// part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionKey {
    pub channel: String,
    pub query: String,
    pub trial_id: Option<String>,
}

impl CompletionKey {
    /// Builds a key from a raw query
    pub fn new(channel: impl Into<String>, query: &str, trial_id: Option<&str>) -> Self {
        Self {
            channel: channel.into(),
            query: normalize_query(query),
            trial_id: trial_id.map(String::from),
        }
    }

    /// Namespaced SHA-256 hex key
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();

        // Length-prefixed parts keep ("a", "bc") and ("ab", "c") apart
        for part in [
            Some(self.channel.as_str()),
            Some(self.query.as_str()),
            self.trial_id.as_deref(),
        ] {
            match part {
                Some(part) => {
                    hasher.update(b"S");
                    hasher.update((part.len() as u64).to_be_bytes());
                    hasher.update(part.as_bytes());
                }
                None => hasher.update(b"N"),
            }
        }

        format!("{}:{}", COMPLETION_NAMESPACE, hex::encode(hasher.finalize()))
    }
}

/// A stored completion together with the request that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCompletion {
    pub channel: String,
    pub query: String,
    pub trial_id: Option<String>,
    /// Time-ordered id of the provider call, kept for audit
    pub request_id: String,
    pub completion: String,
    pub cached_at: DateTime<Utc>,
}

impl CachedCompletion {
    pub fn new(key: &CompletionKey, request_id: impl Into<String>, completion: &str) -> Self {
        Self {
            channel: key.channel.clone(),
            query: key.query.clone(),
            trial_id: key.trial_id.clone(),
            request_id: request_id.into(),
            completion: normalize_query(completion),
            cached_at: Utc::now(),
        }
    }

    pub fn key(&self) -> CompletionKey {
        CompletionKey {
            channel: self.channel.clone(),
            query: self.query.clone(),
            trial_id: self.trial_id.clone(),
        }
    }
}
