//! Brace annotation checks
//!
//! A model annotates a parameter by wrapping each occurrence in `{...}`. The
//! annotated text may add braces and backticks but must not change anything
//! else.

use thiserror::Error;

/// Annotation problems a retriever retries on
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnnotationError {
    #[error("Nested braces in annotated text: {annotated}")]
    NestedBraces { annotated: String },

    #[error("Unbalanced braces in annotated text: {annotated}")]
    UnbalancedBraces { annotated: String },

    #[error(
        "Annotated text does not match the input once braces and backticks are removed.\nInput: {input}\nAnnotated: {annotated}"
    )]
    TextModified { input: String, annotated: String },
}

/// Remove `{`, `}` and backticks
pub fn strip_markup(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '{' | '}' | '`')).collect()
}

/// Text of each `{...}` span, in order, with backticks removed
///
/// Spans that are empty after trimming are skipped.
pub fn annotated_spans(annotated: &str) -> Result<Vec<String>, AnnotationError> {
    let mut spans = Vec::new();
    let mut current: Option<String> = None;

    for c in annotated.chars() {
        match c {
            '{' if current.is_some() => {
                return Err(AnnotationError::NestedBraces {
                    annotated: annotated.to_string(),
                });
            }
            '{' => current = Some(String::new()),
            '}' => {
                let span = current.take().ok_or_else(|| AnnotationError::UnbalancedBraces {
                    annotated: annotated.to_string(),
                })?;
                let span = span.trim();

                if !span.is_empty() {
                    spans.push(span.to_string());
                }
            }
            '`' => {}
            c => {
                if let Some(span) = current.as_mut() {
                    span.push(c);
                }
            }
        }
    }

    if current.is_some() {
        return Err(AnnotationError::UnbalancedBraces {
            annotated: annotated.to_string(),
        });
    }

    Ok(spans)
}

/// Check that annotation left the input text unchanged
pub fn check_annotation(input: &str, annotated: &str) -> Result<(), AnnotationError> {
    if strip_markup(annotated) != input {
        return Err(AnnotationError::TextModified {
            input: input.to_string(),
            annotated: annotated.to_string(),
        });
    }

    Ok(())
}
