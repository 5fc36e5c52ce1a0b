use serde::{Deserialize, Serialize};

use super::Message;
use crate::domain::DomainError;

/// Why the provider stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
}

/// Token counts reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// The one message a provider answered with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub id: String,
    pub model: String,
    pub message: Message,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<Usage>,
}

impl LlmResponse {
    pub fn new(id: String, model: String, message: Message) -> Self {
        Self {
            id,
            model,
            message,
            finish_reason: None,
            usage: None,
        }
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn content(&self) -> &str {
        self.message.content_text()
    }
}

/// Takes the single item of a provider answer
///
/// A completion is exactly one message. No item is a provider error; more
/// than one is an internal error, since requests never ask for alternatives.
pub fn single_message<T>(provider: &str, items: Vec<T>, unit: &str) -> Result<T, DomainError> {
    let count = items.len();

    if count > 1 {
        return Err(DomainError::internal(format!(
            "{} returned more than one response message ({} {})",
            provider, count, unit
        )));
    }

    items
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::provider(provider, format!("No {} in response", unit)))
}
