//! Entry proposal and approval workflow

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entry::{Entry, EntryKey};
use crate::domain::extraction::Retriever;
use crate::domain::storage::{DataSource, DataSourceExt, Record};
use crate::domain::DomainError;

/// Runs a retriever over entries and records human decisions on the result
#[derive(Debug, Clone)]
pub struct EntryService {
    retriever: Arc<dyn Retriever>,
    data_source: Arc<dyn DataSource>,
}

impl EntryService {
    pub fn new(retriever: Arc<dyn Retriever>, data_source: Arc<dyn DataSource>) -> Self {
        Self {
            retriever,
            data_source,
        }
    }

    /// Propose a value for the entry and save it
    ///
    /// An extraction failure escalates the entry instead of failing the call.
    pub async fn run_propose(
        &self,
        mut entry: Entry,
        param_description: &str,
        dataset: &str,
    ) -> Result<Entry, DomainError> {
        entry.init()?;

        let proposal = match self
            .retriever
            .retrieve(entry.text(), param_description, &[], true)
            .await
        {
            Ok(value) => value,
            Err(e @ DomainError::Extraction { .. }) => {
                warn!(entry_id = %entry.entry_id, error = %e, "Escalating entry");
                None
            }
            Err(e) => return Err(e),
        };

        entry.apply_proposal(proposal);
        self.data_source.save_one(&entry, dataset).await?;

        info!(
            entry_id = %entry.entry_id,
            status = ?entry.status,
            retriever = self.retriever.retriever_id(),
            "Entry proposal saved"
        );

        Ok(entry)
    }

    /// Approve the stored proposal of an entry
    pub async fn run_approve(
        &self,
        entry_id: &str,
        approver: &str,
        dataset: &str,
    ) -> Result<Entry, DomainError> {
        let mut entry = self.load(entry_id, dataset).await?;
        entry.approve(approver)?;
        self.data_source.save_one(&entry, dataset).await?;

        info!(entry_id = %entry.entry_id, approver = %approver, "Entry approved");
        Ok(entry)
    }

    /// Replace the proposal of an entry with a reviewed value
    pub async fn run_override(
        &self,
        entry_id: &str,
        value: &str,
        approver: &str,
        dataset: &str,
    ) -> Result<Entry, DomainError> {
        let mut entry = self.load(entry_id, dataset).await?;
        entry.override_value(value, approver)?;
        self.data_source.save_one(&entry, dataset).await?;

        info!(entry_id = %entry.entry_id, approver = %approver, "Entry overridden");
        Ok(entry)
    }

    async fn load(&self, entry_id: &str, dataset: &str) -> Result<Entry, DomainError> {
        let key = EntryKey::new(entry_id)?;

        self.data_source
            .load_one(&key, dataset)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Entry '{}' not found", entry_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::EntryStatus;
    use crate::domain::llm::ScriptedCompletionModel;
    use crate::infrastructure::retrieval::AnnotatingRetriever;
    use crate::infrastructure::storage::CacheDataSource;

    const DATASET: &str = "entries";

    fn service(completions: Vec<&str>) -> (EntryService, Arc<CacheDataSource>) {
        let data_source = Arc::new(CacheDataSource::new());
        let retriever = AnnotatingRetriever::new(
            Arc::new(ScriptedCompletionModel::new(completions)),
            data_source.clone(),
            "retrievals",
        );
        (
            EntryService::new(Arc::new(retriever), data_source.clone()),
            data_source,
        )
    }

    fn entry() -> Entry {
        Entry::new("SOFR swap").with_body("Sell 10y SOFR swap at 3.45%")
    }

    #[tokio::test]
    async fn test_propose_then_approve() {
        let (service, data_source) = service(vec![
            r#"{"success":"Y","annotated_text":"Sell 10y SOFR swap at {3.45%}"}"#,
        ]);

        let entry = service
            .run_propose(entry(), "Fixed rate.", DATASET)
            .await
            .unwrap();
        assert_eq!(entry.status, Some(EntryStatus::Completed));
        assert_eq!(entry.proposed_value.as_deref(), Some("3.45%"));

        let approved = service
            .run_approve(&entry.entry_id, "alice", DATASET)
            .await
            .unwrap();
        assert_eq!(approved.approved_by.as_deref(), Some("alice"));

        let stored: Entry = data_source
            .load_one(&entry.entry_id, DATASET)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.approved_by.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_extraction_failure_escalates() {
        let (service, _) = service(vec![
            r#"{"success":"N","justification":"No rate."}"#,
            r#"{"success":"N","justification":"No rate."}"#,
        ]);

        let entry = service
            .run_propose(entry(), "Fixed rate.", DATASET)
            .await
            .unwrap();
        assert_eq!(entry.status, Some(EntryStatus::Escalation));
        assert_eq!(entry.proposed_value, None);

        assert!(service
            .run_approve(&entry.entry_id, "alice", DATASET)
            .await
            .is_err());

        let overridden = service
            .run_override(&entry.entry_id, "3.45%", "alice", DATASET)
            .await
            .unwrap();
        assert_eq!(overridden.status, Some(EntryStatus::Override));
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let data_source = Arc::new(CacheDataSource::new());
        let retriever = AnnotatingRetriever::new(
            Arc::new(ScriptedCompletionModel::new(Vec::<String>::new()).then_error("down")),
            data_source.clone(),
            "retrievals",
        );
        let service = EntryService::new(Arc::new(retriever), data_source);

        let result = service.run_propose(entry(), "Fixed rate.", DATASET).await;
        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_approve_missing_entry() {
        let (service, _) = service(vec![]);

        let result = service.run_approve("Entry: Missing", "alice", DATASET).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));

        let result = service.run_approve("not an id", "alice", DATASET).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
