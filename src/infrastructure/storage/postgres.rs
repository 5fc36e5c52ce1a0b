//! PostgreSQL data source with connection pooling

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::domain::storage::{DataSource, StoredRecord};
use crate::domain::DomainError;

/// Default table holding every dataset
pub const DEFAULT_RECORDS_TABLE: &str = "records";

/// PostgreSQL data source configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    pub table_name: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/convince".to_string(),
            table_name: DEFAULT_RECORDS_TABLE.to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }
}

/// Data source storing records in one PostgreSQL table
///
/// Each row holds `(dataset, pk)` as primary key, the type chain, and the record
/// fields as JSONB. Saves are upserts and are autocommitted.
pub struct PostgresDataSource {
    pool: PgPool,
    table_name: String,
    data_source_id: String,
}

impl Debug for PostgresDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDataSource")
            .field("table_name", &self.table_name)
            .field("data_source_id", &self.data_source_id)
            .finish()
    }
}

impl PostgresDataSource {
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();

        Self {
            pool,
            data_source_id: format!("postgres:{}", table_name),
            table_name,
        }
    }

    /// Connects with a pool built from the configuration
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool, config.table_name.clone()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the records table if it does not exist
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                dataset VARCHAR(255) NOT NULL,
                pk TEXT NOT NULL,
                type_chain JSONB NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (dataset, pk)
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        Ok(())
    }
}

fn stored_from_row(row: &PgRow) -> Result<StoredRecord, DomainError> {
    let type_chain: Value = row.get("type_chain");
    let data: Value = row.get("data");

    let type_chain: Vec<String> = serde_json::from_value(type_chain)
        .map_err(|e| DomainError::storage(format!("Invalid stored type chain: {}", e)))?;

    let Value::Object(data) = data else {
        return Err(DomainError::storage("Stored record data is not a JSON object"));
    };

    Ok(StoredRecord { type_chain, data })
}

#[async_trait]
impl DataSource for PostgresDataSource {
    fn data_source_id(&self) -> &str {
        &self.data_source_id
    }

    async fn save_raw(
        &self,
        dataset: &str,
        pk: &str,
        record: StoredRecord,
    ) -> Result<(), DomainError> {
        let query = format!(
            r#"
            INSERT INTO {} (dataset, pk, type_chain, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (dataset, pk)
            DO UPDATE SET type_chain = EXCLUDED.type_chain, data = EXCLUDED.data, updated_at = NOW()
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(dataset)
            .bind(pk)
            .bind(Value::from(record.type_chain))
            .bind(Value::Object(record.data))
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to save record '{}': {}", pk, e)))?;

        Ok(())
    }

    async fn load_raw(
        &self,
        dataset: &str,
        pk: &str,
    ) -> Result<Option<StoredRecord>, DomainError> {
        let query = format!(
            "SELECT type_chain, data FROM {} WHERE dataset = $1 AND pk = $2",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(dataset)
            .bind(pk)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to load record '{}': {}", pk, e)))?;

        row.as_ref().map(stored_from_row).transpose()
    }

    async fn delete_raw(&self, dataset: &str, pk: &str) -> Result<bool, DomainError> {
        let query = format!(
            "DELETE FROM {} WHERE dataset = $1 AND pk = $2",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(dataset)
            .bind(pk)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete record '{}': {}", pk, e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_raw(&self, dataset: &str) -> Result<Vec<(String, StoredRecord)>, DomainError> {
        let query = format!(
            "SELECT pk, type_chain, data FROM {} WHERE dataset = $1 ORDER BY pk",
            self.table_name
        );

        let rows = sqlx::query(&query)
            .bind(dataset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list records: {}", e)))?;

        rows.iter()
            .map(|row| {
                let pk: String = row.get("pk");
                Ok((pk, stored_from_row(row)?))
            })
            .collect()
    }

    async fn commit(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DomainError> {
        Err(DomainError::unsupported(
            "PostgresDataSource autocommits every write, rollback is not supported",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::Entry;
    use crate::domain::storage::{to_dict, DataSourceExt, Record};

    #[test]
    fn test_postgres_config_default() {
        let config = PostgresConfig::default();

        assert_eq!(config.table_name, "records");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
    }

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/test")
            .with_table_name("convince_records")
            .with_max_connections(20)
            .with_min_connections(2);

        assert_eq!(config.url, "postgres://localhost/test");
        assert_eq!(config.table_name, "convince_records");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 2);
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_postgres_save_and_load() {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/convince_test".to_string());
        let source = PostgresDataSource::connect(&PostgresConfig::new(url))
            .await
            .unwrap();
        source.ensure_table().await.unwrap();

        let mut entry = Entry::new("Sell 10y SOFR swap");
        entry.init().unwrap();
        source.save_one(&entry, "test").await.unwrap();

        let loaded: Entry = source.load_one(&entry, "test").await.unwrap().unwrap();
        assert_eq!(to_dict(&loaded).unwrap(), to_dict(&entry).unwrap());

        assert!(source.delete_one(&entry, "test").await.unwrap());
    }
}
