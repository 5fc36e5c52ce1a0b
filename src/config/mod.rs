//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, CompletionCacheSettings, LlmSettings, LogFormat, LoggingConfig,
    ServerConfig, StorageSection,
};
