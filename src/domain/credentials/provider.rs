use async_trait::async_trait;
use std::fmt::Debug;

use super::{Credential, CredentialType};
use crate::domain::DomainError;

/// Source of provider API keys
#[async_trait]
pub trait CredentialProvider: Send + Sync + Debug {
    /// Look up the key for a provider; `Ok(None)` when it is simply not configured
    async fn find_credential(
        &self,
        credential_type: &CredentialType,
    ) -> Result<Option<Credential>, DomainError>;

    /// Name of the key source, used in log fields
    fn source_name(&self) -> &'static str;

    /// Like `find_credential`, but a missing key is a credential error naming its variable
    async fn get_credential(
        &self,
        credential_type: &CredentialType,
    ) -> Result<Credential, DomainError> {
        self.find_credential(credential_type).await?.ok_or_else(|| {
            DomainError::credential(format!(
                "{} is not set ({} source)",
                credential_type.env_var(),
                self.source_name()
            ))
        })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    /// Fixed set of keys, for wiring tests that must not touch the environment
    #[derive(Debug, Default)]
    pub struct MockCredentialProvider {
        credentials: HashMap<CredentialType, Credential>,
        name: &'static str,
    }

    impl MockCredentialProvider {
        pub fn new(name: &'static str) -> Self {
            Self {
                credentials: HashMap::new(),
                name,
            }
        }

        pub fn with_credential(mut self, credential: Credential) -> Self {
            self.credentials
                .insert(credential.credential_type(), credential);
            self
        }
    }

    #[async_trait]
    impl CredentialProvider for MockCredentialProvider {
        async fn find_credential(
            &self,
            credential_type: &CredentialType,
        ) -> Result<Option<Credential>, DomainError> {
            Ok(self.credentials.get(credential_type).cloned())
        }

        fn source_name(&self) -> &'static str {
            self.name
        }
    }

    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_missing_key_names_variable() {
            let credentials = MockCredentialProvider::new("mock")
                .with_credential(Credential::new(CredentialType::OpenAi, "sk-1"));

            assert!(credentials
                .find_credential(&CredentialType::Anthropic)
                .await
                .unwrap()
                .is_none());

            let err = credentials
                .get_credential(&CredentialType::Anthropic)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Credential { .. }));
            assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

            let found = credentials.get_credential(&CredentialType::OpenAi).await.unwrap();
            assert_eq!(found.credential_type(), CredentialType::OpenAi);
        }
    }
}
