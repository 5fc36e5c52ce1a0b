//! Storage domain - records, persisted format, and the data source abstraction

mod dict;
mod entity;
mod registry;
mod repository;

pub use dict::{from_dict, restore_record, to_dict, StoredRecord, TYPE_KEY};
pub use entity::{Record, RecordKey, ToPk};
pub use registry::{RecordRegistry, RecordTypeInfo, RecordTypeSummary};
pub use repository::{DataSource, DataSourceExt};

#[cfg(test)]
pub(crate) use entity::fixtures;
