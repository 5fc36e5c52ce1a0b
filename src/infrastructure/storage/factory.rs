//! Data source factory for runtime storage selection

use std::sync::Arc;

use crate::domain::storage::DataSource;
use crate::domain::DomainError;

use super::in_memory::CacheDataSource;
use super::postgres::{PostgresConfig, PostgresDataSource};

/// Supported data source backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory data source (for testing/development)
    InMemory,
    /// PostgreSQL data source
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" | "cache" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Resolved data source settings
#[derive(Debug, Clone)]
pub enum StorageSettings {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageSettings {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for data source instances
#[derive(Debug)]
pub struct DataSourceFactory;

impl DataSourceFactory {
    /// Creates a data source; for PostgreSQL the records table is created if missing
    pub async fn create(settings: &StorageSettings) -> Result<Arc<dyn DataSource>, DomainError> {
        match settings {
            StorageSettings::InMemory => Ok(Arc::new(CacheDataSource::new())),
            StorageSettings::Postgres(pg_config) => {
                let source = PostgresDataSource::connect(pg_config).await?;
                source.ensure_table().await?;
                Ok(Arc::new(source))
            }
        }
    }
}
