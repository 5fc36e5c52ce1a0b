use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::llm::LlmProviderKind;

/// LLM vendor a credential belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    OpenAi,
    Anthropic,
    Gemini,
    Fireworks,
}

impl CredentialType {
    /// Environment variable holding the API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Fireworks => "FIREWORKS_API_KEY",
        }
    }
}

impl From<LlmProviderKind> for CredentialType {
    fn from(kind: LlmProviderKind) -> Self {
        match kind {
            LlmProviderKind::OpenAi => Self::OpenAi,
            LlmProviderKind::Anthropic => Self::Anthropic,
            LlmProviderKind::Gemini => Self::Gemini,
            LlmProviderKind::Fireworks => Self::Fireworks,
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialType::OpenAi => write!(f, "openai"),
            CredentialType::Anthropic => write!(f, "anthropic"),
            CredentialType::Gemini => write!(f, "gemini"),
            CredentialType::Fireworks => write!(f, "fireworks"),
        }
    }
}

/// API key for one provider
#[derive(Clone)]
pub struct Credential {
    credential_type: CredentialType,
    api_key: String,
    fetched_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(credential_type: CredentialType, api_key: impl Into<String>) -> Self {
        Self {
            credential_type,
            api_key: api_key.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn credential_type(&self) -> CredentialType {
        self.credential_type
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("credential_type", &self.credential_type)
            .field("api_key", &"***")
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}
