//! LLM handle with a completion cache

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::cache::{CachedCompletion, CompletionCache, CompletionCacheExt, CompletionKey};
use crate::domain::llm::{CompletionModel, LlmConfig, LlmProvider, LlmRequest};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_completion_cache_lookup, record_llm_request, LlmRequestMetricParams,
};

/// A configured model bound to its provider and completion cache
///
/// Completions are cached under `(llm_id, normalized query, trial_id)`, so a
/// repeated query returns the stored completion without calling the provider.
#[derive(Debug, Clone)]
pub struct Llm {
    config: LlmConfig,
    provider: Arc<dyn LlmProvider>,
    cache: Arc<dyn CompletionCache>,
}

impl Llm {
    pub fn new(
        config: LlmConfig,
        provider: Arc<dyn LlmProvider>,
        cache: Arc<dyn CompletionCache>,
    ) -> Self {
        Self {
            config,
            provider,
            cache,
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Calls the provider once, bypassing the cache
    pub async fn uncached_completion(
        &self,
        request_id: &str,
        query: &str,
    ) -> Result<String, DomainError> {
        let request = LlmRequest::builder()
            .user(query)
            .max_tokens_opt(self.config.max_tokens)
            .temperature_opt(self.config.temperature)
            .build();

        debug!(
            llm_id = %self.config.llm_id,
            request_id = %request_id,
            model = %self.config.model_name,
            "Sending completion request"
        );

        let start = Instant::now();
        let result = self.provider.chat(&self.config.model_name, request).await;

        record_llm_request(LlmRequestMetricParams {
            provider: self.provider.provider_name(),
            model: &self.config.model_name,
            duration: start.elapsed(),
            success: result.is_ok(),
            input_tokens: result
                .as_ref()
                .ok()
                .and_then(|r| r.usage.as_ref())
                .map(|u| u.prompt_tokens as u64),
            output_tokens: result
                .as_ref()
                .ok()
                .and_then(|r| r.usage.as_ref())
                .map(|u| u.completion_tokens as u64),
        });

        Ok(result?.content().to_string())
    }
}

#[async_trait]
impl CompletionModel for Llm {
    fn llm_id(&self) -> &str {
        &self.config.llm_id
    }

    async fn completion(
        &self,
        query: &str,
        trial_id: Option<&str>,
    ) -> Result<String, DomainError> {
        let key = CompletionKey::new(&self.config.llm_id, query, trial_id);

        if let Some(cached) = self.cache.get(&key).await? {
            record_completion_cache_lookup(&self.config.llm_id, true);
            debug!(
                llm_id = %self.config.llm_id,
                trial_id = ?trial_id,
                request_id = %cached.request_id,
                "Completion cache hit"
            );
            return Ok(cached.completion);
        }

        record_completion_cache_lookup(&self.config.llm_id, false);

        let request_id = Uuid::now_v7().to_string();
        info!(
            llm_id = %self.config.llm_id,
            trial_id = ?trial_id,
            request_id = %request_id,
            "Completion cache miss"
        );

        let completion = self.uncached_completion(&request_id, &key.query).await?;
        let entry = CachedCompletion::new(&key, request_id, &completion);

        if !self.cache.put(&entry).await? {
            // Another caller stored this key first; its completion wins
            if let Some(existing) = self.cache.get(&key).await? {
                return Ok(existing.completion);
            }
        }

        Ok(entry.completion)
    }
}
