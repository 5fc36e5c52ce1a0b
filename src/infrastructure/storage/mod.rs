//! Data source implementations

mod factory;
mod in_memory;
mod postgres;

pub use factory::{DataSourceFactory, StorageSettings, StorageType};
pub use in_memory::CacheDataSource;
pub use postgres::{PostgresConfig, PostgresDataSource, DEFAULT_RECORDS_TABLE};
