//! Text completion contract used by retrievers

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// A model that turns a query into a completion
///
/// `trial_id` distinguishes otherwise identical queries so that each trial of a
/// retry loop gets an independent sample.
#[async_trait]
pub trait CompletionModel: Send + Sync + Debug {
    /// Identifier of the model, used as the completion cache channel
    fn llm_id(&self) -> &str;

    async fn completion(&self, query: &str, trial_id: Option<&str>)
    -> Result<String, DomainError>;
}
