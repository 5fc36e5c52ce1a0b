use async_trait::async_trait;
use std::collections::HashMap;
use std::env;

use crate::domain::{Credential, CredentialProvider, CredentialType, DomainError};

/// Credential provider that reads API keys from environment variables
#[derive(Debug)]
pub struct EnvCredentialProvider {
    mappings: HashMap<CredentialType, String>,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    pub fn with_mapping(mut self, credential_type: CredentialType, env_var: impl Into<String>) -> Self {
        self.mappings.insert(credential_type, env_var.into());
        self
    }

    /// Standard variable for every provider, e.g. `OPENAI_API_KEY`
    pub fn with_defaults(mut self) -> Self {
        for credential_type in [
            CredentialType::OpenAi,
            CredentialType::Anthropic,
            CredentialType::Gemini,
            CredentialType::Fireworks,
        ] {
            self.mappings
                .insert(credential_type, credential_type.env_var().to_string());
        }

        self
    }

    fn variable_for(&self, credential_type: &CredentialType) -> Option<&str> {
        self.mappings.get(credential_type).map(String::as_str)
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new().with_defaults()
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn find_credential(
        &self,
        credential_type: &CredentialType,
    ) -> Result<Option<Credential>, DomainError> {
        let Some(env_var) = self.variable_for(credential_type) else {
            return Ok(None);
        };

        // Blank values count as unset
        match env::var(env_var) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(Some(Credential::new(*credential_type, value.trim())))
            }
            _ => Ok(None),
        }
    }

    async fn get_credential(
        &self,
        credential_type: &CredentialType,
    ) -> Result<Credential, DomainError> {
        self.find_credential(credential_type).await?.ok_or_else(|| {
            match self.variable_for(credential_type) {
                Some(env_var) => DomainError::credential(format!(
                    "Environment variable '{}' not set for {} provider",
                    env_var, credential_type
                )),
                None => DomainError::credential(format!(
                    "No environment variable mapped for {} provider",
                    credential_type
                )),
            }
        })
    }

    fn source_name(&self) -> &'static str {
        "env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_provider_reads_variable() {
        // SAFETY: Test runs in isolation with a unique variable name
        unsafe {
            env::set_var("CONVINCE_TEST_GEMINI_KEY", "g-key");
        }

        let provider = EnvCredentialProvider::new()
            .with_mapping(CredentialType::Gemini, "CONVINCE_TEST_GEMINI_KEY");

        let cred = provider.get_credential(&CredentialType::Gemini).await.unwrap();
        assert_eq!(cred.api_key(), "g-key");
        assert_eq!(cred.credential_type(), CredentialType::Gemini);

        // SAFETY: Test cleanup
        unsafe {
            env::remove_var("CONVINCE_TEST_GEMINI_KEY");
        }
    }

    #[tokio::test]
    async fn test_env_provider_missing_variable() {
        let provider = EnvCredentialProvider::new()
            .with_mapping(CredentialType::OpenAi, "NONEXISTENT_VAR_12345");

        let err = provider
            .get_credential(&CredentialType::OpenAi)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Credential { .. }));
        assert!(err.is_user_error());
        assert!(err.to_string().contains("NONEXISTENT_VAR_12345"));
        assert!(provider
            .find_credential(&CredentialType::OpenAi)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unmapped_type() {
        let provider = EnvCredentialProvider::new();
        let err = provider
            .get_credential(&CredentialType::Fireworks)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No environment variable mapped"));
    }

    #[test]
    fn test_defaults_cover_all_types() {
        let provider = EnvCredentialProvider::default();
        assert_eq!(provider.mappings.len(), 4);
        assert_eq!(provider.mappings[&CredentialType::Fireworks], "FIREWORKS_API_KEY");
    }
}
