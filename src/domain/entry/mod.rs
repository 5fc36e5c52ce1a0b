//! Entry domain - user-submitted text units with deterministic ids

mod entity;
mod key;

pub use entity::{Entry, EntryStatus, DEFAULT_ENTRY_TYPE};
pub use key::{
    check_entry_id, entry_hash, get_entry_id, validate_description, validate_record_type,
    EntryKey, EntryKeyError, MAX_DESCRIPTION_LENGTH,
};
