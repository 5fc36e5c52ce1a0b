use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::http_client::{HttpClient, DEFAULT_REQUEST_TIMEOUT};
use super::{AnthropicProvider, GeminiProvider, OpenAiProvider};
use crate::domain::{
    Credential, CredentialProvider, CredentialType, DomainError, LlmProvider, LlmProviderKind,
};

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create a provider of the given kind from a credential
    pub fn create(
        kind: LlmProviderKind,
        credential: &Credential,
        base_url: Option<&str>,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        Self::validate_credential_type(credential, CredentialType::from(kind))?;

        let http_client = HttpClient::with_timeout(DEFAULT_REQUEST_TIMEOUT)?;
        let api_key = credential.api_key();

        let provider: Arc<dyn LlmProvider> = match (kind, base_url) {
            (LlmProviderKind::OpenAi, None) => Arc::new(OpenAiProvider::new(http_client, api_key)),
            (LlmProviderKind::OpenAi, Some(url)) => {
                Arc::new(OpenAiProvider::with_base_url(http_client, api_key, url))
            }
            (LlmProviderKind::Fireworks, None) => {
                Arc::new(OpenAiProvider::fireworks(http_client, api_key))
            }
            (LlmProviderKind::Fireworks, Some(url)) => Arc::new(
                OpenAiProvider::with_base_url(http_client, api_key, url).with_name("fireworks"),
            ),
            (LlmProviderKind::Anthropic, None) => {
                Arc::new(AnthropicProvider::new(http_client, api_key))
            }
            (LlmProviderKind::Anthropic, Some(url)) => {
                Arc::new(AnthropicProvider::with_base_url(http_client, api_key, url))
            }
            (LlmProviderKind::Gemini, None) => Arc::new(GeminiProvider::new(http_client, api_key)),
            (LlmProviderKind::Gemini, Some(url)) => {
                Arc::new(GeminiProvider::with_base_url(http_client, api_key, url))
            }
        };

        Ok(provider)
    }

    fn validate_credential_type(
        credential: &Credential,
        expected: CredentialType,
    ) -> Result<(), DomainError> {
        if credential.credential_type() != expected {
            return Err(DomainError::configuration(format!(
                "Expected credential type {}, got {}",
                expected,
                credential.credential_type()
            )));
        }
        Ok(())
    }
}

/// Provider clients shared by every LLM handle, one per provider kind
///
/// Built once at startup and passed to the services that need it.
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<LlmProviderKind, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: LlmProviderKind, provider: Arc<dyn LlmProvider>) {
        self.providers.insert(kind, provider);
    }

    pub fn with_provider(mut self, kind: LlmProviderKind, provider: Arc<dyn LlmProvider>) -> Self {
        self.register(kind, provider);
        self
    }

    /// Build a provider for every kind whose credential is available
    pub async fn from_credentials(
        credentials: &dyn CredentialProvider,
        base_urls: &HashMap<LlmProviderKind, String>,
    ) -> Result<Self, DomainError> {
        let mut registry = Self::new();

        for kind in LlmProviderKind::all() {
            let credential_type = CredentialType::from(kind);

            let Some(credential) = credentials.find_credential(&credential_type).await? else {
                debug!(
                    provider = %kind,
                    source = credentials.source_name(),
                    "No credential available, provider not registered"
                );
                continue;
            };

            let provider = LlmProviderFactory::create(
                kind,
                &credential,
                base_urls.get(&kind).map(String::as_str),
            )?;
            registry.register(kind, provider);
        }

        if registry.providers.is_empty() {
            warn!("No LLM provider credentials found");
        }

        Ok(registry)
    }

    /// Provider for a kind; a missing provider means its API key is not configured
    pub fn get(&self, kind: LlmProviderKind) -> Result<Arc<dyn LlmProvider>, DomainError> {
        self.providers.get(&kind).cloned().ok_or_else(|| {
            DomainError::credential(format!(
                "No API key configured for provider '{}', set {}",
                kind,
                CredentialType::from(kind).env_var()
            ))
        })
    }

    pub fn kinds(&self) -> Vec<LlmProviderKind> {
        let mut kinds: Vec<LlmProviderKind> = self.providers.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }
}
