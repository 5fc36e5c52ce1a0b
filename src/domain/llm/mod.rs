//! LLM domain models and traits

mod completion;
mod config;
mod message;
mod provider;
mod request;
mod response;

pub use completion::CompletionModel;
pub use config::{LlmConfig, LlmKey, LlmProviderKind};
pub use message::{Message, MessageRole};
pub use provider::LlmProvider;
pub use request::{LlmRequest, LlmRequestBuilder};
pub use response::{single_message, FinishReason, LlmResponse, Usage};

#[cfg(test)]
pub use completion::mock::ScriptedCompletionModel;
#[cfg(test)]
pub use provider::mock::MockLlmProvider;
