//! Record-type registry
//!
//! Maps type names to concrete record types so that a stored record can be
//! reconstructed from the leaf of its `_t` chain without knowing its type
//! statically.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::dict::{restore_record, StoredRecord};
use super::entity::Record;
use crate::domain::entry::Entry;
use crate::domain::llm::LlmConfig;
use crate::domain::retrieval::{MultipleChoiceRetrieval, Retrieval};
use crate::domain::DomainError;

type ReconstructFn = fn(StoredRecord, &str) -> Result<Map<String, Value>, DomainError>;

/// Registered record type
#[derive(Debug, Clone)]
pub struct RecordTypeInfo {
    pub name: &'static str,
    pub type_chain: Vec<&'static str>,
    reconstruct: ReconstructFn,
}

/// Public description of a registered type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordTypeSummary {
    pub name: String,
    pub type_chain: Vec<String>,
}

impl From<&RecordTypeInfo> for RecordTypeSummary {
    fn from(info: &RecordTypeInfo) -> Self {
        Self {
            name: info.name.to_string(),
            type_chain: info.type_chain.iter().map(|t| t.to_string()).collect(),
        }
    }
}

fn reconstruct_as<R: Record>(
    stored: StoredRecord,
    expected_pk: &str,
) -> Result<Map<String, Value>, DomainError> {
    let record: R = restore_record(stored, expected_pk)?;
    Ok(StoredRecord::from_record(&record)?.into_dict())
}

/// Registry of known record types
#[derive(Debug, Clone, Default)]
pub struct RecordRegistry {
    types: HashMap<&'static str, RecordTypeInfo>,
}

impl RecordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every record type defined by this crate
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        registry.register::<Entry>();
        registry.register::<Retrieval>();
        registry.register::<MultipleChoiceRetrieval>();
        registry.register::<LlmConfig>();
        registry
    }

    pub fn register<R: Record>(&mut self) {
        self.types.insert(
            R::TYPE_NAME,
            RecordTypeInfo {
                name: R::TYPE_NAME,
                type_chain: R::type_chain(),
                reconstruct: reconstruct_as::<R>,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&RecordTypeInfo> {
        self.types.get(name)
    }

    /// Registered types sorted by name
    pub fn types(&self) -> Vec<RecordTypeSummary> {
        let mut types: Vec<RecordTypeSummary> =
            self.types.values().map(RecordTypeSummary::from).collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }

    /// Rebuilds the concrete leaf type of a stored record and returns its dict form
    pub fn reconstruct(
        &self,
        stored: StoredRecord,
        expected_pk: &str,
    ) -> Result<Map<String, Value>, DomainError> {
        let leaf = stored.leaf_type().to_string();
        let info = self.get(&leaf).ok_or_else(|| {
            DomainError::validation(format!("Record type '{}' is not registered", leaf))
        })?;

        (info.reconstruct)(stored, expected_pk)
    }
}
