//! Domain layer - Core business logic and entities

pub mod cache;
pub mod credentials;
pub mod entry;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod storage;

pub use cache::{
    normalize_query, CachedCompletion, CompletionCache, CompletionCacheExt, CompletionKey,
};
pub use credentials::{Credential, CredentialProvider, CredentialType};
pub use entry::{Entry, EntryKey, EntryStatus};
pub use error::DomainError;
pub use extraction::{Retriever, TrialOutcome, TrialStep};
pub use llm::{
    CompletionModel, FinishReason, LlmConfig, LlmKey, LlmProvider, LlmProviderKind, LlmRequest,
    LlmRequestBuilder, LlmResponse, Message, MessageRole, Usage,
};
pub use prompt::{PromptTemplate, TemplateError};
pub use retrieval::{MultipleChoiceRetrieval, Retrieval, RetrievalKey, RetrievalRecord};
pub use storage::{DataSource, DataSourceExt, Record, RecordKey, RecordRegistry, StoredRecord, ToPk};
