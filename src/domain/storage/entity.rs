//! Record and key traits

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Anything that resolves to a primary-key string: a raw pk, a key, or a record
pub trait ToPk {
    fn to_pk(&self) -> String;
}

impl ToPk for str {
    fn to_pk(&self) -> String {
        self.to_string()
    }
}

impl ToPk for String {
    fn to_pk(&self) -> String {
        self.clone()
    }
}

impl<T: ToPk + ?Sized> ToPk for &T {
    fn to_pk(&self) -> String {
        (**self).to_pk()
    }
}

/// Trait for record key types
pub trait RecordKey: ToPk + Clone + Debug + Send + Sync {}

/// Trait for types that can be persisted in a data source
///
/// `type_chain` lists type names from the root of the hierarchy to the leaf and
/// is stored with every record under the `_t` discriminator.
pub trait Record: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The key type for this record
    type Key: RecordKey;

    /// Name of the concrete (leaf) type
    const TYPE_NAME: &'static str;

    /// Type names from root to leaf, leaf last
    fn type_chain() -> Vec<&'static str> {
        vec![Self::TYPE_NAME]
    }

    /// Returns the record's key
    fn key(&self) -> Self::Key;

    /// Primary key string of the record
    fn get_pk(&self) -> String {
        self.key().to_pk()
    }

    /// Validates the record and derives computed fields
    fn init(&mut self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SampleKey {
        pub id: String,
    }

    impl ToPk for SampleKey {
        fn to_pk(&self) -> String {
            self.id.clone()
        }
    }

    impl RecordKey for SampleKey {}

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SampleRecord {
        pub id: String,
        pub name: String,
        pub value: i64,
    }

    impl SampleRecord {
        pub fn new(id: &str, name: &str, value: i64) -> Self {
            Self {
                id: id.to_string(),
                name: name.to_string(),
                value,
            }
        }
    }

    impl Record for SampleRecord {
        type Key = SampleKey;
        const TYPE_NAME: &'static str = "SampleRecord";

        fn key(&self) -> SampleKey {
            SampleKey {
                id: self.id.clone(),
            }
        }
    }

    impl ToPk for SampleRecord {
        fn to_pk(&self) -> String {
            self.get_pk()
        }
    }

    /// Derived type whose chain starts with `SampleRecord`
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct DerivedSampleRecord {
        #[serde(flatten)]
        pub base: SampleRecord,
        pub extra: String,
    }

    impl Record for DerivedSampleRecord {
        type Key = SampleKey;
        const TYPE_NAME: &'static str = "DerivedSampleRecord";

        fn type_chain() -> Vec<&'static str> {
            vec![SampleRecord::TYPE_NAME, Self::TYPE_NAME]
        }

        fn key(&self) -> SampleKey {
            self.base.key()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_to_pk_for_strings() {
        assert_eq!("abc".to_pk(), "abc");
        assert_eq!(String::from("abc").to_pk(), "abc");
        assert_eq!((&&"abc").to_pk(), "abc");
    }

    #[test]
    fn test_record_pk_comes_from_key() {
        let record = SampleRecord::new("r-1", "Sample", 1);
        assert_eq!(record.get_pk(), "r-1");
        assert_eq!(record.key().to_pk(), "r-1");
    }

    #[test]
    fn test_default_type_chain_is_leaf_only() {
        assert_eq!(SampleRecord::type_chain(), vec!["SampleRecord"]);
        assert_eq!(
            DerivedSampleRecord::type_chain(),
            vec!["SampleRecord", "DerivedSampleRecord"]
        );
    }
}
