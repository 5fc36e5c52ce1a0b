//! LLM provider implementations

mod anthropic;
mod factory;
mod gemini;
mod http_client;
mod openai;

pub use anthropic::AnthropicProvider;
pub use factory::{LlmProviderFactory, ProviderRegistry};
pub use gemini::GeminiProvider;
pub use http_client::{HttpClient, HttpClientTrait, DEFAULT_REQUEST_TIMEOUT};
pub use openai::{OpenAiProvider, FIREWORKS_BASE_URL};
