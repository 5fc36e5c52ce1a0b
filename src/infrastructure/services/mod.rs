//! Infrastructure services

mod completion_service;
mod entry_service;

pub use completion_service::Llm;
pub use entry_service::EntryService;
