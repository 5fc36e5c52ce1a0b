//! Prompt template parsing and rendering
//!
//! Placeholders use field syntax: `{name}` where `name` is an identifier.
//! `{{` and `}}` render as literal braces.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::DomainError;

static VARIABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },

    #[error("Invalid variable name: {name}")]
    InvalidVariableName { name: String },

    #[error("Template parsing error: {message}")]
    ParseError { message: String },
}

impl From<TemplateError> for DomainError {
    fn from(err: TemplateError) -> Self {
        DomainError::template(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse a template string
    pub fn parse(content: impl Into<String>) -> Result<Self, TemplateError> {
        let content = content.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = content.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|(_, next)| *next) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|(_, next)| *next) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;

                    for (_, next) in chars.by_ref() {
                        if next == '}' {
                            closed = true;
                            break;
                        }
                        name.push(next);
                    }

                    if !closed {
                        return Err(TemplateError::ParseError {
                            message: format!("Unclosed '{{' at position {}", position),
                        });
                    }

                    if !VARIABLE_NAME.is_match(&name) {
                        return Err(TemplateError::InvalidVariableName { name });
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Variable(name));
                }
                '}' => {
                    return Err(TemplateError::ParseError {
                        message: format!("Single '}}' at position {}", position),
                    });
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { content, segments })
    }

    /// Get the original template content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Variable names in order of first appearance
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();

        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Variable(name) if seen.insert(name.as_str()) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Render the template with provided values
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        let mut result = String::with_capacity(self.content.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Variable(name) => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingVariable { name: name.clone() })?;
                    result.push_str(value);
                }
            }
        }

        Ok(result)
    }
}

/// Flatten a record into template variables
///
/// Strings are used verbatim, null becomes an empty string, and arrays are
/// joined with `", "`.
pub fn record_variables<T: Serialize>(record: &T) -> Result<HashMap<String, String>, TemplateError> {
    let value = serde_json::to_value(record).map_err(|e| TemplateError::ParseError {
        message: format!("Record cannot be serialized: {}", e),
    })?;

    let Value::Object(fields) = value else {
        return Err(TemplateError::ParseError {
            message: "Record does not serialize to a map".to_string(),
        });
    };

    Ok(fields
        .into_iter()
        .map(|(name, value)| (name, variable_text(&value)))
        .collect())
}

fn variable_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(variable_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_no_variables() {
        let template = PromptTemplate::parse("Hello, world!").unwrap();
        assert!(template.variables().is_empty());
        assert_eq!(template.render(&HashMap::new()).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_render_variables() {
        let template =
            PromptTemplate::parse("Find {param_description} in: {input_text}").unwrap();

        assert_eq!(template.variables(), vec!["param_description", "input_text"]);

        let result = template
            .render(&values(&[
                ("param_description", "Fixed rate."),
                ("input_text", "Sell 10y SOFR swap at 3.45%"),
            ]))
            .unwrap();
        assert_eq!(result, "Find Fixed rate. in: Sell 10y SOFR swap at 3.45%");
    }

    #[test]
    fn test_duplicate_variables_listed_once() {
        let template = PromptTemplate::parse("{a} and {a} and {b}").unwrap();
        assert_eq!(template.variables(), vec!["a", "b"]);
        assert_eq!(template.render(&values(&[("a", "1"), ("b", "2")])).unwrap(), "1 and 1 and 2");
    }

    #[test]
    fn test_escaped_braces() {
        let template =
            PromptTemplate::parse(r#"Reply with {{"success": "Y"}} for {name}"#).unwrap();

        assert_eq!(template.variables(), vec!["name"]);
        assert_eq!(
            template.render(&values(&[("name", "x")])).unwrap(),
            r#"Reply with {"success": "Y"} for x"#
        );
    }

    #[test]
    fn test_missing_variable() {
        let template = PromptTemplate::parse("Hello, {name}!").unwrap();

        assert_eq!(
            template.render(&HashMap::new()),
            Err(TemplateError::MissingVariable {
                name: "name".to_string()
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            PromptTemplate::parse("Hello {name"),
            Err(TemplateError::ParseError { .. })
        ));
        assert!(matches!(
            PromptTemplate::parse("Hello name}"),
            Err(TemplateError::ParseError { .. })
        ));
        assert!(matches!(
            PromptTemplate::parse("Hello {first name}"),
            Err(TemplateError::InvalidVariableName { .. })
        ));
    }

    #[test]
    fn test_record_variables() {
        #[derive(Serialize)]
        struct Sample {
            input_text: String,
            samples: Vec<String>,
            value: Option<String>,
            success: bool,
        }

        let vars = record_variables(&Sample {
            input_text: "text".to_string(),
            samples: vec!["USD".to_string(), "EUR".to_string()],
            value: None,
            success: true,
        })
        .unwrap();

        assert_eq!(vars["input_text"], "text");
        assert_eq!(vars["samples"], "USD, EUR");
        assert_eq!(vars["value"], "");
        assert_eq!(vars["success"], "true");
    }

    #[test]
    fn test_template_error_is_user_error() {
        let err: DomainError = TemplateError::MissingVariable {
            name: "x".to_string(),
        }
        .into();
        assert!(err.is_user_error());
    }
}
