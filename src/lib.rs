//! Convince runtime
//!
//! Turns free-text entries into structured parameter values:
//! - Deterministic entry ids derived from type, description, body and data
//! - Typed records persisted through pluggable data sources
//! - LLM completions cached by query and trial
//! - Retrievers that run bounded trial loops against a completion model

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use api::AppState;
use domain::RecordRegistry;
use infrastructure::{
    cache::CompletionCacheFactory,
    credentials::EnvCredentialProvider,
    llm::ProviderRegistry,
    services::Llm,
    storage::DataSourceFactory,
};

/// Build the REST state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_settings = config.storage.to_storage_settings()?;
    let data_source = DataSourceFactory::create(&storage_settings).await?;

    info!(
        data_source = %data_source.data_source_id(),
        dataset = %config.storage.dataset,
        "Data source ready"
    );

    Ok(AppState::new(data_source, Arc::new(RecordRegistry::with_builtin_types()))
        .with_default_user(&config.auth.default_user)
        .with_default_dataset(&config.storage.dataset))
}

/// Build the configured LLM handle with its provider and completion cache
///
/// API keys are read from the environment.
pub async fn create_llm(config: &AppConfig) -> anyhow::Result<Llm> {
    let llm_config = config.llm.to_llm_config()?;

    let mut base_urls = HashMap::new();

    if let Some(ref base_url) = llm_config.base_url {
        base_urls.insert(llm_config.provider, base_url.clone());
    }

    let credentials = EnvCredentialProvider::default();
    let providers = ProviderRegistry::from_credentials(&credentials, &base_urls).await?;
    let provider = providers.get(llm_config.provider)?;

    let cache_config = config.completion_cache.to_cache_config()?;
    let cache = CompletionCacheFactory::new().create(&cache_config).await?;

    info!(
        llm_id = %llm_config.llm_id,
        provider = %llm_config.provider,
        model = %llm_config.model_name,
        cache = %cache_config.backend,
        "LLM ready"
    );

    Ok(Llm::new(llm_config, provider, cache))
}
