//! Entry identity
//!
//! Entry ids have the form `{Type}: {description}`, followed by
//! ` (MD5: {hex})` when the entry carries a body or data. The hash is taken over
//! `{body}.{data}` with a missing part written as `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::storage::{RecordKey, ToPk};
use crate::domain::DomainError;

/// Maximum length of an entry description, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Substrings that may not appear in a description
const FORBIDDEN_SUBSTRINGS: [(&str, &str); 5] = [
    (":", "colon"),
    ("(", "opening parenthesis"),
    (")", "closing parenthesis"),
    ("\r", "carriage return"),
    ("\n", "line feed"),
];

static RECORD_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").unwrap());

static ENTRY_PREFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:]+): (.+)$").unwrap());

static HASH_SUFFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(MD5: [0-9a-f]{32}\)$").unwrap());

/// Entry id validation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EntryKeyError {
    #[error("Entry description is empty")]
    EmptyDescription,

    #[error("Entry description has {length} characters, the maximum is {max}")]
    DescriptionTooLong { length: usize, max: usize },

    #[error("Entry description '{description}' contains a {name}")]
    ForbiddenSubstring { description: String, name: &'static str },

    #[error("Record type '{record_type}' is not in PascalCase")]
    InvalidRecordType { record_type: String },

    #[error("Entry id '{entry_id}' has an invalid suffix, expected ' (MD5: <32 lowercase hex digits>)'")]
    InvalidHashSuffix { entry_id: String },

    #[error("Entry id '{entry_id}' is not in the format '{{Type}}: {{description}}'")]
    InvalidFormat { entry_id: String },
}

impl From<EntryKeyError> for DomainError {
    fn from(err: EntryKeyError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Validate an entry description (title)
pub fn validate_description(description: &str) -> Result<(), EntryKeyError> {
    if description.is_empty() {
        return Err(EntryKeyError::EmptyDescription);
    }

    let length = description.chars().count();

    if length > MAX_DESCRIPTION_LENGTH {
        return Err(EntryKeyError::DescriptionTooLong {
            length,
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    if let Some(&(_, name)) = FORBIDDEN_SUBSTRINGS
        .iter()
        .find(|(substring, _)| description.contains(substring))
    {
        return Err(EntryKeyError::ForbiddenSubstring {
            description: description.to_string(),
            name,
        });
    }

    Ok(())
}

/// Validate a record type name used as the entry id prefix
pub fn validate_record_type(record_type: &str) -> Result<(), EntryKeyError> {
    if !RECORD_TYPE_PATTERN.is_match(record_type) {
        return Err(EntryKeyError::InvalidRecordType {
            record_type: record_type.to_string(),
        });
    }

    Ok(())
}

/// MD5 hex digest of `{body}.{data}`
pub fn entry_hash(body: Option<&str>, data: Option<&str>) -> String {
    let input = format!("{}.{}", body.unwrap_or("None"), data.unwrap_or("None"));
    format!("{:x}", md5::compute(input.as_bytes()))
}

/// Build the entry id from its parts
pub fn get_entry_id(
    record_type: &str,
    description: &str,
    body: Option<&str>,
    data: Option<&str>,
) -> Result<String, EntryKeyError> {
    validate_record_type(record_type)?;
    validate_description(description)?;

    let has_body = body.is_some_and(|b| !b.is_empty());
    let has_data = data.is_some_and(|d| !d.is_empty());

    if has_body || has_data {
        Ok(format!(
            "{}: {} (MD5: {})",
            record_type,
            description,
            entry_hash(body, data)
        ))
    } else {
        Ok(format!("{}: {}", record_type, description))
    }
}

/// Validate an existing entry id
pub fn check_entry_id(entry_id: &str) -> Result<(), EntryKeyError> {
    let prefix = match entry_id.split_once('(') {
        Some((prefix, rest)) => {
            let suffix = format!("({}", rest);

            if !HASH_SUFFIX_PATTERN.is_match(&suffix) {
                return Err(EntryKeyError::InvalidHashSuffix {
                    entry_id: entry_id.to_string(),
                });
            }

            prefix
                .strip_suffix(' ')
                .ok_or_else(|| EntryKeyError::InvalidHashSuffix {
                    entry_id: entry_id.to_string(),
                })?
        }
        None => entry_id,
    };

    let captures =
        ENTRY_PREFIX_PATTERN
            .captures(prefix)
            .ok_or_else(|| EntryKeyError::InvalidFormat {
                entry_id: entry_id.to_string(),
            })?;

    validate_record_type(&captures[1])?;
    validate_description(&captures[2])?;

    Ok(())
}

/// Key of an entry record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub entry_id: String,
}

impl EntryKey {
    /// Create a key from an existing id after validation
    pub fn new(entry_id: impl Into<String>) -> Result<Self, EntryKeyError> {
        let entry_id = entry_id.into();
        check_entry_id(&entry_id)?;
        Ok(Self { entry_id })
    }

    /// Create a key from the parts the id is derived from
    pub fn from_parts(
        record_type: &str,
        description: &str,
        body: Option<&str>,
        data: Option<&str>,
    ) -> Result<Self, EntryKeyError> {
        Ok(Self {
            entry_id: get_entry_id(record_type, description, body, data)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.entry_id
    }
}

impl ToPk for EntryKey {
    fn to_pk(&self) -> String {
        self.entry_id.clone()
    }
}

impl RecordKey for EntryKey {}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.entry_id)
    }
}
