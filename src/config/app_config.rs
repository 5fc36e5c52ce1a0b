use std::time::Duration;

use serde::Deserialize;

use crate::domain::{DomainError, LlmConfig, LlmProviderKind};
use crate::infrastructure::cache::{CompletionCacheConfig, CompletionCacheType};
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::{PostgresConfig, StorageSettings, StorageType};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub llm: LlmSettings,
    pub completion_cache: CompletionCacheSettings,
    pub storage: StorageSection,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Model used by the retrievers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub llm_id: String,
    pub provider: String,
    pub model_name: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionCacheSettings {
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    pub max_capacity: Option<u64>,
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub backend: String,
    pub database_url: Option<String>,
    pub table_name: Option<String>,
    pub max_connections: Option<u32>,
    /// Dataset used when a caller names none
    pub dataset: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub default_user: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            llm_id: "gpt-4o".to_string(),
            provider: "open_ai".to_string(),
            model_name: "gpt-4o".to_string(),
            max_tokens: None,
            temperature: Some(0.0),
            base_url: None,
        }
    }
}

impl Default for CompletionCacheSettings {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            redis_url: None,
            key_prefix: None,
            max_capacity: Some(10_000),
            ttl_seconds: None,
        }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            database_url: None,
            table_name: None,
            max_connections: None,
            dataset: "default".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_user: "anonymous".to_string(),
        }
    }
}

impl LlmSettings {
    /// Validated LLM handle configuration
    pub fn to_llm_config(&self) -> Result<LlmConfig, DomainError> {
        let provider: LlmProviderKind = self.provider.parse()?;
        let mut config = LlmConfig::new(&self.llm_id, provider, &self.model_name);
        config.max_tokens = self.max_tokens;
        config.temperature = self.temperature;
        config.base_url = self.base_url.clone();

        crate::domain::Record::init(&mut config)?;
        Ok(config)
    }
}

impl CompletionCacheSettings {
    pub fn to_cache_config(&self) -> Result<CompletionCacheConfig, DomainError> {
        let backend: CompletionCacheType = self.backend.parse()?;

        Ok(CompletionCacheConfig {
            backend,
            redis_url: self.redis_url.clone(),
            key_prefix: self.key_prefix.clone(),
            max_capacity: self.max_capacity,
            time_to_live: self.ttl_seconds.map(Duration::from_secs),
        })
    }
}

impl StorageSection {
    pub fn to_storage_settings(&self) -> Result<StorageSettings, DomainError> {
        let storage_type = StorageType::parse(&self.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown storage backend '{}'", self.backend))
        })?;

        match storage_type {
            StorageType::InMemory => Ok(StorageSettings::in_memory()),
            StorageType::Postgres => {
                let url = self.database_url.as_deref().ok_or_else(|| {
                    DomainError::configuration("storage.database_url is required for postgres")
                })?;

                let mut config = PostgresConfig::new(url);

                if let Some(ref table_name) = self.table_name {
                    config = config.with_table_name(table_name);
                }

                if let Some(max) = self.max_connections {
                    config = config.with_max_connections(max);
                }

                Ok(StorageSettings::Postgres(config))
            }
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
