//! Extraction domain - parsing and checking model output

mod annotation;
mod json;
mod retriever;

pub use annotation::{annotated_spans, check_annotation, strip_markup, AnnotationError};
pub use json::{extract_json_object, parse_flag, string_field};
pub use retriever::{Retriever, TrialOutcome, TrialStep};
