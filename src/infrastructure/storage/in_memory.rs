//! In-memory data source

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::storage::{DataSource, StoredRecord};
use crate::domain::DomainError;

type Dataset = BTreeMap<String, Map<String, Value>>;

/// Thread-safe in-memory data source
///
/// Records are kept in their dict form (including `_t`) under dataset and pk.
/// Writes take effect immediately, so there is never anything to commit and
/// nothing can be rolled back. Data is lost when the process terminates.
#[derive(Debug)]
pub struct CacheDataSource {
    data_source_id: String,
    datasets: RwLock<HashMap<String, Dataset>>,
}

impl Default for CacheDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheDataSource {
    pub fn new() -> Self {
        Self::with_id("cache")
    }

    pub fn with_id(data_source_id: impl Into<String>) -> Self {
        Self {
            data_source_id: data_source_id.into(),
            datasets: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records in a dataset
    pub fn count(&self, dataset: &str) -> Result<usize, DomainError> {
        let datasets = self.datasets.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(datasets.get(dataset).map(BTreeMap::len).unwrap_or(0))
    }
}

#[async_trait]
impl DataSource for CacheDataSource {
    fn data_source_id(&self) -> &str {
        &self.data_source_id
    }

    async fn save_raw(
        &self,
        dataset: &str,
        pk: &str,
        record: StoredRecord,
    ) -> Result<(), DomainError> {
        let mut datasets = self.datasets.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        datasets
            .entry(dataset.to_string())
            .or_default()
            .insert(pk.to_string(), record.into_dict());

        Ok(())
    }

    async fn load_raw(
        &self,
        dataset: &str,
        pk: &str,
    ) -> Result<Option<StoredRecord>, DomainError> {
        let dict = {
            let datasets = self.datasets.read().map_err(|e| {
                DomainError::storage(format!("Failed to acquire read lock: {}", e))
            })?;

            datasets.get(dataset).and_then(|records| records.get(pk)).cloned()
        };

        dict.map(StoredRecord::from_dict).transpose()
    }

    async fn delete_raw(&self, dataset: &str, pk: &str) -> Result<bool, DomainError> {
        let mut datasets = self.datasets.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(datasets
            .get_mut(dataset)
            .and_then(|records| records.remove(pk))
            .is_some())
    }

    async fn list_raw(&self, dataset: &str) -> Result<Vec<(String, StoredRecord)>, DomainError> {
        let records: Vec<(String, Map<String, Value>)> = {
            let datasets = self.datasets.read().map_err(|e| {
                DomainError::storage(format!("Failed to acquire read lock: {}", e))
            })?;

            datasets
                .get(dataset)
                .map(|records| {
                    records
                        .iter()
                        .map(|(pk, dict)| (pk.clone(), dict.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        records
            .into_iter()
            .map(|(pk, dict)| Ok((pk, StoredRecord::from_dict(dict)?)))
            .collect()
    }

    async fn commit(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DomainError> {
        Err(DomainError::unsupported(
            "CacheDataSource writes immediately, rollback is not supported",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::Entry;
    use crate::domain::retrieval::{MultipleChoiceRetrieval, Retrieval};
    use crate::domain::storage::fixtures::{DerivedSampleRecord, SampleRecord};
    use crate::domain::storage::{to_dict, DataSourceExt, Record};

    const DATASET: &str = "common";

    #[tokio::test]
    async fn test_save_then_load_preserves_dict() {
        let source = CacheDataSource::new();
        let mut entry = Entry::new("Sell 10y SOFR swap").with_body("Sell 10y SOFR swap at 3.45%");
        entry.init().unwrap();

        source.save_one(&entry, DATASET).await.unwrap();

        let loaded: Entry = source.load_one(&entry, DATASET).await.unwrap().unwrap();
        assert_eq!(to_dict(&loaded).unwrap(), to_dict(&entry).unwrap());
    }

    #[tokio::test]
    async fn test_load_by_pk_key_or_record() {
        let source = CacheDataSource::new();
        let record = SampleRecord::new("r-1", "Sample", 7);
        source.save_one(&record, DATASET).await.unwrap();

        let by_pk: Option<SampleRecord> = source.load_one("r-1", DATASET).await.unwrap();
        let by_key: Option<SampleRecord> = source.load_one(&record.key(), DATASET).await.unwrap();
        let by_record: Option<SampleRecord> = source.load_one(&record, DATASET).await.unwrap();

        assert_eq!(by_pk.as_ref(), Some(&record));
        assert_eq!(by_key.as_ref(), Some(&record));
        assert_eq!(by_record.as_ref(), Some(&record));
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let source = CacheDataSource::new();
        let loaded: Option<SampleRecord> = source.load_one("missing", DATASET).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_datasets_are_isolated() {
        let source = CacheDataSource::new();
        source
            .save_one(&SampleRecord::new("r-1", "A", 1), "first")
            .await
            .unwrap();

        let other: Option<SampleRecord> = source.load_one("r-1", "second").await.unwrap();
        assert!(other.is_none());
        assert_eq!(source.count("first").unwrap(), 1);
        assert_eq!(source.count("second").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_many_keeps_lookup_order() {
        let source = CacheDataSource::new();
        let records = vec![
            SampleRecord::new("a", "A", 1),
            SampleRecord::new("b", "B", 2),
        ];
        source.save_many(&records, DATASET).await.unwrap();

        let lookups = ["b", "missing", "a"];
        let loaded: Vec<Option<SampleRecord>> =
            source.load_many(&lookups, DATASET).await.unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].as_ref().map(|r| r.id.as_str()), Some("b"));
        assert!(loaded[1].is_none());
        assert_eq!(loaded[2].as_ref().map(|r| r.id.as_str()), Some("a"));
    }

    #[tokio::test]
    async fn test_derived_record_loads_as_base_type() {
        let source = CacheDataSource::new();
        let derived = DerivedSampleRecord {
            base: SampleRecord::new("d-1", "Derived", 3),
            extra: "more".to_string(),
        };
        source.save_one(&derived, DATASET).await.unwrap();

        let base: SampleRecord = source.load_one("d-1", DATASET).await.unwrap().unwrap();
        assert_eq!(base, derived.base);

        let as_derived: DerivedSampleRecord =
            source.load_one("d-1", DATASET).await.unwrap().unwrap();
        assert_eq!(as_derived, derived);
    }

    #[tokio::test]
    async fn test_load_as_unrelated_type_fails() {
        let source = CacheDataSource::new();
        source
            .save_one(&SampleRecord::new("r-1", "A", 1), DATASET)
            .await
            .unwrap();

        let result: Result<Option<Entry>, _> = source.load_one("r-1", DATASET).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_pk_mismatch_is_internal_error() {
        let source = CacheDataSource::new();
        let stored = StoredRecord::from_record(&SampleRecord::new("actual", "A", 1)).unwrap();
        source.save_raw(DATASET, "other", stored).await.unwrap();

        let result: Result<Option<SampleRecord>, _> = source.load_one("other", DATASET).await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_load_all_filters_by_type_chain() {
        let source = CacheDataSource::new();
        let plain = Retrieval::new("AnnotatingRetriever", "0", "text", "param", &[]);
        let choice = MultipleChoiceRetrieval::new(
            Retrieval::new("MultipleChoiceRetriever", "0", "text", "ccy", &[]),
            &["USD".to_string()],
        );
        source.save_one(&plain, DATASET).await.unwrap();
        source.save_one(&choice, DATASET).await.unwrap();
        source
            .save_one(&SampleRecord::new("s", "S", 1), DATASET)
            .await
            .unwrap();

        let retrievals: Vec<Retrieval> = source.load_all(DATASET).await.unwrap();
        assert_eq!(retrievals.len(), 2);

        let choices: Vec<MultipleChoiceRetrieval> = source.load_all(DATASET).await.unwrap();
        assert_eq!(choices, vec![choice]);
    }

    #[tokio::test]
    async fn test_delete() {
        let source = CacheDataSource::new();
        let records = vec![
            SampleRecord::new("a", "A", 1),
            SampleRecord::new("b", "B", 2),
        ];
        source.save_many(&records, DATASET).await.unwrap();

        assert!(source.delete_one("a", DATASET).await.unwrap());
        assert!(!source.delete_one("a", DATASET).await.unwrap());
        assert_eq!(source.delete_many(&["a", "b"], DATASET).await.unwrap(), 1);
        assert_eq!(source.count(DATASET).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_requires_pk() {
        let source = CacheDataSource::new();
        let entry = Entry::new("Not initialized");

        let result = source.save_one(&entry, DATASET).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_commit_and_rollback() {
        let source = CacheDataSource::new();
        assert!(source.commit().await.is_ok());
        assert!(matches!(
            source.rollback().await,
            Err(DomainError::Unsupported { .. })
        ));
    }
}
