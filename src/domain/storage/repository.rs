//! Data source trait definition

use std::fmt::Debug;
use std::future::Future;

use async_trait::async_trait;

use super::dict::{restore_record, StoredRecord};
use super::entity::{Record, ToPk};
use crate::domain::DomainError;

/// Generic keyed record store
///
/// Records are addressed by dataset name and primary-key string. This trait works
/// on serialized records to stay dyn-compatible; use [`DataSourceExt`] for typed
/// operations.
#[async_trait]
pub trait DataSource: Send + Sync + Debug {
    /// Identifier of the data source instance
    fn data_source_id(&self) -> &str;

    /// Writes a serialized record, replacing any record with the same pk
    async fn save_raw(
        &self,
        dataset: &str,
        pk: &str,
        record: StoredRecord,
    ) -> Result<(), DomainError>;

    /// Reads a serialized record
    async fn load_raw(&self, dataset: &str, pk: &str)
    -> Result<Option<StoredRecord>, DomainError>;

    /// Deletes a record, returns true if it existed
    async fn delete_raw(&self, dataset: &str, pk: &str) -> Result<bool, DomainError>;

    /// Lists all records of a dataset with their primary keys
    async fn list_raw(&self, dataset: &str) -> Result<Vec<(String, StoredRecord)>, DomainError>;

    /// Makes pending writes durable
    async fn commit(&self) -> Result<(), DomainError>;

    /// Discards pending writes
    async fn rollback(&self) -> Result<(), DomainError>;
}

/// Extension trait providing typed record operations
pub trait DataSourceExt: DataSource {
    /// Saves one record
    fn save_one<'a, R>(
        &'a self,
        record: &'a R,
        dataset: &'a str,
    ) -> impl Future<Output = Result<(), DomainError>> + Send
    where
        R: Record,
    {
        async move {
            let pk = record.get_pk();

            if pk.is_empty() {
                return Err(DomainError::validation(format!(
                    "{} record has an empty primary key, call init() before saving",
                    R::TYPE_NAME
                )));
            }

            let stored = StoredRecord::from_record(record)?;
            self.save_raw(dataset, &pk, stored).await
        }
    }

    /// Saves several records
    fn save_many<'a, R>(
        &'a self,
        records: &'a [R],
        dataset: &'a str,
    ) -> impl Future<Output = Result<(), DomainError>> + Send
    where
        R: Record,
    {
        async move {
            for record in records {
                self.save_one(record, dataset).await?;
            }

            Ok(())
        }
    }

    /// Loads one record by pk string, key, or record
    fn load_one<'a, R, L>(
        &'a self,
        lookup: &'a L,
        dataset: &'a str,
    ) -> impl Future<Output = Result<Option<R>, DomainError>> + Send
    where
        R: Record,
        L: ToPk + Sync + ?Sized,
    {
        async move {
            let pk = lookup.to_pk();

            match self.load_raw(dataset, &pk).await? {
                Some(stored) => Ok(Some(restore_record(stored, &pk)?)),
                None => Ok(None),
            }
        }
    }

    /// Loads several records, results are in lookup order
    fn load_many<'a, R, L>(
        &'a self,
        lookups: &'a [L],
        dataset: &'a str,
    ) -> impl Future<Output = Result<Vec<Option<R>>, DomainError>> + Send
    where
        R: Record,
        L: ToPk + Sync,
    {
        async move {
            let mut results = Vec::with_capacity(lookups.len());

            for lookup in lookups {
                results.push(self.load_one(lookup, dataset).await?);
            }

            Ok(results)
        }
    }

    /// Loads every record of the dataset whose type chain contains `R`
    fn load_all<'a, R>(
        &'a self,
        dataset: &'a str,
    ) -> impl Future<Output = Result<Vec<R>, DomainError>> + Send
    where
        R: Record,
    {
        async move {
            let mut results = Vec::new();

            for (pk, stored) in self.list_raw(dataset).await? {
                if stored.contains_type(R::TYPE_NAME) {
                    results.push(restore_record(stored, &pk)?);
                }
            }

            Ok(results)
        }
    }

    /// Deletes one record, returns true if it existed
    fn delete_one<'a, L>(
        &'a self,
        lookup: &'a L,
        dataset: &'a str,
    ) -> impl Future<Output = Result<bool, DomainError>> + Send
    where
        L: ToPk + Sync + ?Sized,
    {
        async move { self.delete_raw(dataset, &lookup.to_pk()).await }
    }

    /// Deletes several records, returns the number deleted
    fn delete_many<'a, L>(
        &'a self,
        lookups: &'a [L],
        dataset: &'a str,
    ) -> impl Future<Output = Result<usize, DomainError>> + Send
    where
        L: ToPk + Sync,
    {
        async move {
            let mut deleted = 0;

            for lookup in lookups {
                if self.delete_one(lookup, dataset).await? {
                    deleted += 1;
                }
            }

            Ok(deleted)
        }
    }
}

// Blanket implementation for all types implementing DataSource
impl<T: DataSource + ?Sized> DataSourceExt for T {}
