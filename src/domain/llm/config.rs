//! Persisted LLM configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::storage::{Record, RecordKey, ToPk};
use crate::domain::DomainError;

/// Remote model vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
    Fireworks,
}

impl LlmProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "open_ai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Fireworks => "fireworks",
        }
    }

    pub fn all() -> [LlmProviderKind; 4] {
        [Self::OpenAi, Self::Anthropic, Self::Gemini, Self::Fireworks]
    }
}

impl fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open_ai" | "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            "fireworks" | "llama" => Ok(Self::Fireworks),
            other => Err(DomainError::configuration(format!(
                "Unknown LLM provider '{}'",
                other
            ))),
        }
    }
}

/// Key of an LLM configuration record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LlmKey {
    pub llm_id: String,
}

impl LlmKey {
    pub fn new(llm_id: impl Into<String>) -> Self {
        Self {
            llm_id: llm_id.into(),
        }
    }
}

impl ToPk for LlmKey {
    fn to_pk(&self) -> String {
        self.llm_id.clone()
    }
}

impl RecordKey for LlmKey {}

/// Logical handle to a remote model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_id: String,
    pub provider: LlmProviderKind,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Overrides the provider's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl LlmConfig {
    pub fn new(
        llm_id: impl Into<String>,
        provider: LlmProviderKind,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            llm_id: llm_id.into(),
            provider,
            model_name: model_name.into(),
            max_tokens: None,
            temperature: None,
            base_url: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Record for LlmConfig {
    type Key = LlmKey;
    const TYPE_NAME: &'static str = "Llm";

    fn key(&self) -> LlmKey {
        LlmKey::new(self.llm_id.clone())
    }

    fn init(&mut self) -> Result<(), DomainError> {
        if self.llm_id.trim().is_empty() {
            return Err(DomainError::validation("LLM id must not be empty"));
        }

        if self.model_name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "LLM '{}' has an empty model name",
                self.llm_id
            )));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(DomainError::validation(format!(
                    "LLM '{}' temperature {} is outside 0.0..=2.0",
                    self.llm_id, temperature
                )));
            }
        }

        Ok(())
    }
}

impl ToPk for LlmConfig {
    fn to_pk(&self) -> String {
        self.get_pk()
    }
}
