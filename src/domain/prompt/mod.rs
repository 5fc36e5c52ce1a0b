//! Prompt domain - field-placeholder templates

mod template;

pub use template::{record_variables, PromptTemplate, TemplateError};
