//! Retrievers - bounded trial loops extracting parameters with a completion model

mod annotating;
mod brace;
mod multiple_choice;
mod prompts;
mod trials;

pub use annotating::{AnnotatingRetriever, ANNOTATING_MAX_TRIALS, ANNOTATING_RETRIEVER_ID};
pub use brace::{BraceRetriever, BRACE_MAX_TRIALS, BRACE_RETRIEVER_ID};
pub use multiple_choice::{
    MultipleChoiceRetriever, MULTIPLE_CHOICE_MAX_TRIALS, MULTIPLE_CHOICE_RETRIEVER_ID,
};
pub use prompts::{corrective_note, ANNOTATING_PROMPT, BRACE_PROMPT, MULTIPLE_CHOICE_PROMPT};
pub use trials::TrialRunner;
