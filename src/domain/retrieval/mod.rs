//! Retrieval domain - per-trial audit records of parameter extraction

mod entity;

pub use entity::{MultipleChoiceRetrieval, Retrieval, RetrievalKey, RetrievalRecord};
