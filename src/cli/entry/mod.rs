//! Entry command - proposes, approves or overrides stored entries

use std::sync::Arc;

use async_trait::async_trait;
use clap::{Args, Subcommand};

use crate::domain::entry::{Entry, DEFAULT_ENTRY_TYPE};
use crate::domain::{CompletionModel, DomainError};
use crate::infrastructure::retrieval::AnnotatingRetriever;
use crate::infrastructure::services::EntryService;
use crate::infrastructure::storage::DataSourceFactory;

#[derive(Args, Debug, Clone)]
pub struct EntryArgs {
    #[command(subcommand)]
    pub action: EntryAction,

    /// Dataset holding entries and retrievals (overrides config)
    #[arg(long, global = true)]
    pub dataset: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EntryAction {
    /// Extract a proposed value for a new entry and save it
    Propose {
        #[arg(long = "type", default_value = DEFAULT_ENTRY_TYPE)]
        entry_type: String,

        /// Entry title, also its description in the entry id
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: Option<String>,

        /// YAML data
        #[arg(long)]
        data: Option<String>,

        /// Description of the parameter to extract
        #[arg(long)]
        param: String,
    },

    /// Approve the proposed value of a stored entry
    Approve {
        entry_id: String,

        #[arg(long)]
        approver: String,
    },

    /// Replace the proposed value of a stored entry
    Override {
        entry_id: String,

        #[arg(long)]
        value: String,

        #[arg(long)]
        approver: String,
    },
}

pub async fn run(args: EntryArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    let dataset = args
        .dataset
        .clone()
        .unwrap_or_else(|| config.storage.dataset.clone());

    let data_source =
        DataSourceFactory::create(&config.storage.to_storage_settings()?).await?;

    // Approve and override only touch storage
    let llm: Arc<dyn CompletionModel> = match args.action {
        EntryAction::Propose { .. } => Arc::new(crate::create_llm(&config).await?),
        _ => Arc::new(NoCompletion),
    };

    let retriever = AnnotatingRetriever::new(llm, data_source.clone(), dataset.clone());
    let service = EntryService::new(Arc::new(retriever), data_source.clone());

    let entry = execute(&service, &args.action, &dataset).await?;
    data_source.commit().await?;

    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

async fn execute(
    service: &EntryService,
    action: &EntryAction,
    dataset: &str,
) -> anyhow::Result<Entry> {
    let entry = match action {
        EntryAction::Propose {
            entry_type,
            title,
            body,
            data,
            param,
        } => {
            let mut entry = Entry::new(title).with_type(entry_type);

            if let Some(body) = body {
                entry = entry.with_body(body);
            }

            if let Some(data) = data {
                entry = entry.with_data(data);
            }

            service.run_propose(entry, param, dataset).await?
        }
        EntryAction::Approve { entry_id, approver } => {
            service.run_approve(entry_id, approver, dataset).await?
        }
        EntryAction::Override {
            entry_id,
            value,
            approver,
        } => service.run_override(entry_id, value, approver, dataset).await?,
    };

    Ok(entry)
}

/// Completion model for actions that only touch storage
#[derive(Debug)]
struct NoCompletion;

#[async_trait]
impl CompletionModel for NoCompletion {
    fn llm_id(&self) -> &str {
        "none"
    }

    async fn completion(
        &self,
        _query: &str,
        _trial_id: Option<&str>,
    ) -> Result<String, DomainError> {
        Err(DomainError::configuration(
            "No completion model is configured for this action",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::EntryStatus;
    use crate::domain::llm::ScriptedCompletionModel;
    use crate::domain::DataSourceExt;
    use crate::infrastructure::storage::CacheDataSource;

    const DATASET: &str = "cli";

    fn service(completions: Vec<&str>) -> (EntryService, Arc<CacheDataSource>) {
        let data_source = Arc::new(CacheDataSource::new());
        let retriever = AnnotatingRetriever::new(
            Arc::new(ScriptedCompletionModel::new(completions)),
            data_source.clone(),
            DATASET,
        );
        (
            EntryService::new(Arc::new(retriever), data_source.clone()),
            data_source,
        )
    }

    fn propose() -> EntryAction {
        EntryAction::Propose {
            entry_type: DEFAULT_ENTRY_TYPE.to_string(),
            title: "SOFR swap".to_string(),
            body: Some("Sell 10y SOFR swap at 3.45%".to_string()),
            data: None,
            param: "Fixed rate.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_propose_then_approve() {
        let (service, data_source) = service(vec![
            r#"{"success":"Y","annotated_text":"Sell 10y SOFR swap at {3.45%}"}"#,
        ]);

        let proposed = execute(&service, &propose(), DATASET).await.unwrap();
        assert_eq!(proposed.status, Some(EntryStatus::Completed));
        assert_eq!(proposed.proposed_value.as_deref(), Some("3.45%"));

        let approve = EntryAction::Approve {
            entry_id: proposed.entry_id.clone(),
            approver: "alice".to_string(),
        };
        let approved = execute(&service, &approve, DATASET).await.unwrap();
        assert_eq!(approved.approved_by.as_deref(), Some("alice"));

        let stored: Entry = data_source
            .load_one(&proposed.entry_id, DATASET)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.approved_by.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_override_without_model() {
        let (seed, data_source) = service(vec![
            r#"{"success":"N","justification":"No rate."}"#,
            r#"{"success":"N","justification":"No rate."}"#,
        ]);
        let escalated = execute(&seed, &propose(), DATASET).await.unwrap();
        assert_eq!(escalated.status, Some(EntryStatus::Escalation));

        let retriever = AnnotatingRetriever::new(Arc::new(NoCompletion), data_source.clone(), DATASET);
        let service = EntryService::new(Arc::new(retriever), data_source);

        let action = EntryAction::Override {
            entry_id: escalated.entry_id.clone(),
            value: "3.45%".to_string(),
            approver: "bob".to_string(),
        };
        let overridden = execute(&service, &action, DATASET).await.unwrap();

        assert_eq!(overridden.status, Some(EntryStatus::Override));
        assert_eq!(overridden.proposed_value.as_deref(), Some("3.45%"));
    }

    #[tokio::test]
    async fn test_approve_unknown_entry_fails() {
        let (service, _) = service(vec![]);
        let action = EntryAction::Approve {
            entry_id: "Entry: Missing".to_string(),
            approver: "alice".to_string(),
        };

        assert!(execute(&service, &action, DATASET).await.is_err());
    }
}
