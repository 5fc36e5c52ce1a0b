//! Persisted record format
//!
//! A record is stored as a plain key-value map plus the reserved `_t` key, which
//! holds the type chain (root to leaf) used for polymorphic reconstruction.

use serde_json::{Map, Value};

use super::entity::Record;
use crate::domain::DomainError;

/// Reserved discriminator key
pub const TYPE_KEY: &str = "_t";

/// Serialized record together with its type chain
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub type_chain: Vec<String>,
    pub data: Map<String, Value>,
}

impl StoredRecord {
    /// Serialize a record
    pub fn from_record<R: Record>(record: &R) -> Result<Self, DomainError> {
        let value = serde_json::to_value(record).map_err(|e| {
            DomainError::validation(format!(
                "Failed to serialize record of type {}: {}",
                R::TYPE_NAME,
                e
            ))
        })?;

        let Value::Object(data) = value else {
            return Err(DomainError::validation(format!(
                "Record of type {} does not serialize to a map",
                R::TYPE_NAME
            )));
        };

        if data.contains_key(TYPE_KEY) {
            return Err(DomainError::validation(format!(
                "Record of type {} uses the reserved field '{}'",
                R::TYPE_NAME,
                TYPE_KEY
            )));
        }

        Ok(Self {
            type_chain: R::type_chain().into_iter().map(String::from).collect(),
            data,
        })
    }

    /// Parse a `_t`-bearing dict
    pub fn from_dict(mut dict: Map<String, Value>) -> Result<Self, DomainError> {
        let chain = dict.remove(TYPE_KEY).ok_or_else(|| {
            DomainError::storage(format!("Stored record has no '{}' discriminator", TYPE_KEY))
        })?;

        let type_chain: Vec<String> = serde_json::from_value(chain).map_err(|e| {
            DomainError::storage(format!("Invalid '{}' discriminator: {}", TYPE_KEY, e))
        })?;

        if type_chain.is_empty() {
            return Err(DomainError::storage(format!(
                "Empty '{}' discriminator",
                TYPE_KEY
            )));
        }

        Ok(Self {
            type_chain,
            data: dict,
        })
    }

    /// The dict form with `_t` in front
    pub fn into_dict(self) -> Map<String, Value> {
        let mut dict = Map::with_capacity(self.data.len() + 1);
        dict.insert(
            TYPE_KEY.to_string(),
            Value::Array(self.type_chain.into_iter().map(Value::String).collect()),
        );
        dict.extend(self.data);
        dict
    }

    /// Name of the concrete stored type
    pub fn leaf_type(&self) -> &str {
        self.type_chain.last().map(String::as_str).unwrap_or_default()
    }

    pub fn contains_type(&self, type_name: &str) -> bool {
        self.type_chain.iter().any(|t| t == type_name)
    }

    /// Deserialize as `R`, which must appear somewhere in the stored chain
    pub fn into_record<R: Record>(self) -> Result<R, DomainError> {
        if !self.contains_type(R::TYPE_NAME) {
            return Err(DomainError::validation(format!(
                "Stored record of type {} cannot be loaded as {}",
                self.leaf_type(),
                R::TYPE_NAME
            )));
        }

        let leaf = self.leaf_type().to_string();
        serde_json::from_value(Value::Object(self.data)).map_err(|e| {
            DomainError::storage(format!(
                "Failed to deserialize stored {} as {}: {}",
                leaf,
                R::TYPE_NAME,
                e
            ))
        })
    }
}

/// Serialize a record to its dict form including `_t`
pub fn to_dict<R: Record>(record: &R) -> Result<Map<String, Value>, DomainError> {
    Ok(StoredRecord::from_record(record)?.into_dict())
}

/// Reconstruct a record from its dict form
pub fn from_dict<R: Record>(dict: Map<String, Value>) -> Result<R, DomainError> {
    StoredRecord::from_dict(dict)?.into_record()
}

/// Reconstruct, run the `init` hook, and check the pk against the lookup pk
pub fn restore_record<R: Record>(stored: StoredRecord, expected_pk: &str) -> Result<R, DomainError> {
    let mut record: R = stored.into_record()?;
    record.init()?;

    let record_pk = record.get_pk();

    if record_pk != expected_pk {
        return Err(DomainError::internal(format!(
            "Primary key of loaded {} record '{}' does not match lookup key '{}'",
            R::TYPE_NAME,
            record_pk,
            expected_pk
        )));
    }

    Ok(record)
}
