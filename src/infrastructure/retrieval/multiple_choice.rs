//! Retriever restricted to a list of valid choices

use std::sync::Arc;

use async_trait::async_trait;

use super::prompts::MULTIPLE_CHOICE_TEMPLATE;
use super::trials::{TrialEvaluator, TrialRunner};
use crate::domain::extraction::{
    extract_json_object, parse_flag, string_field, Retriever, TrialOutcome,
};
use crate::domain::llm::CompletionModel;
use crate::domain::prompt::PromptTemplate;
use crate::domain::retrieval::{MultipleChoiceRetrieval, Retrieval};
use crate::domain::storage::DataSource;
use crate::domain::DomainError;

pub const MULTIPLE_CHOICE_RETRIEVER_ID: &str = "MultipleChoiceRetriever";

pub const MULTIPLE_CHOICE_MAX_TRIALS: usize = 2;

/// Maps loosely worded text onto one of a fixed set of choices
///
/// The answer is matched against the choices ignoring case and surrounding
/// whitespace, and the canonical spelling is returned. An answer outside the
/// list is retried with a corrective note.
#[derive(Debug, Clone)]
pub struct MultipleChoiceRetriever {
    runner: TrialRunner,
    template: PromptTemplate,
    valid_choices: Vec<String>,
}

impl MultipleChoiceRetriever {
    pub fn new(
        llm: Arc<dyn CompletionModel>,
        data_source: Arc<dyn DataSource>,
        dataset: impl Into<String>,
        valid_choices: Vec<String>,
    ) -> Self {
        Self {
            runner: TrialRunner::new(llm, data_source, dataset, MULTIPLE_CHOICE_MAX_TRIALS),
            template: MULTIPLE_CHOICE_TEMPLATE.clone(),
            valid_choices,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn valid_choices(&self) -> &[String] {
        &self.valid_choices
    }

    fn canonical_choice(&self, value: &str) -> Option<&str> {
        let value = value.trim();

        self.valid_choices
            .iter()
            .find(|choice| choice.trim().eq_ignore_ascii_case(value))
            .map(String::as_str)
    }
}

impl TrialEvaluator for MultipleChoiceRetriever {
    type Record = MultipleChoiceRetrieval;

    fn retriever_id(&self) -> &str {
        MULTIPLE_CHOICE_RETRIEVER_ID
    }

    fn template(&self) -> &PromptTemplate {
        &self.template
    }

    fn new_record(&self, base: Retrieval) -> MultipleChoiceRetrieval {
        MultipleChoiceRetrieval::new(base, &self.valid_choices)
    }

    fn evaluate(&self, record: &mut MultipleChoiceRetrieval, completion: &str) -> TrialOutcome {
        let retrieval = &mut record.base;

        let Some(json) = extract_json_object(completion) else {
            let diagnostic = format!("Completion does not contain a JSON object: {}", completion);
            retrieval.fail(diagnostic.clone());
            return TrialOutcome::Failed(diagnostic);
        };

        retrieval.justification = string_field(&json, "justification");

        if json.get("success").and_then(parse_flag) != Some(true) {
            retrieval.success = Some(false);
            return TrialOutcome::NotFound(
                retrieval
                    .justification
                    .clone()
                    .unwrap_or_else(|| "Model reported that the parameter is absent".to_string()),
            );
        }

        let Some(value) = string_field(&json, "param_value") else {
            let diagnostic = "Completion reports success but has no param_value".to_string();
            retrieval.fail(diagnostic.clone());
            return TrialOutcome::Failed(diagnostic);
        };

        match self.canonical_choice(&value) {
            Some(choice) => {
                retrieval.success = Some(true);
                retrieval.param_value = Some(choice.to_string());
                TrialOutcome::Accepted(choice.to_string())
            }
            None => {
                let diagnostic = format!(
                    "Value '{}' is not one of the valid choices: {}",
                    value,
                    self.valid_choices.join(", ")
                );
                retrieval.fail(diagnostic.clone());
                TrialOutcome::Violation(diagnostic)
            }
        }
    }
}

#[async_trait]
impl Retriever for MultipleChoiceRetriever {
    fn retriever_id(&self) -> &str {
        MULTIPLE_CHOICE_RETRIEVER_ID
    }

    async fn retrieve(
        &self,
        input_text: &str,
        param_description: &str,
        param_samples: &[String],
        is_required: bool,
    ) -> Result<Option<String>, DomainError> {
        if self.valid_choices.is_empty() {
            return Err(DomainError::validation(
                "MultipleChoiceRetriever requires at least one valid choice",
            ));
        }

        self.runner
            .run(self, input_text, param_description, param_samples, is_required)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::ScriptedCompletionModel;
    use crate::domain::storage::DataSourceExt;
    use crate::infrastructure::storage::CacheDataSource;

    const INPUT: &str = "Pay fixed on $100m 5y swap";
    const DATASET: &str = "retrievals";

    fn currencies() -> Vec<String> {
        vec!["USD".to_string(), "EUR".to_string(), "GBP".to_string()]
    }

    fn setup(
        completions: Vec<&str>,
    ) -> (MultipleChoiceRetriever, Arc<ScriptedCompletionModel>, Arc<CacheDataSource>) {
        let llm = Arc::new(ScriptedCompletionModel::new(completions));
        let data_source = Arc::new(CacheDataSource::new());
        let retriever =
            MultipleChoiceRetriever::new(llm.clone(), data_source.clone(), DATASET, currencies());
        (retriever, llm, data_source)
    }

    #[tokio::test]
    async fn test_maps_loose_wording_to_choice() {
        let (retriever, llm, data_source) = setup(vec![
            r#"{"success":"Y","param_value":"usd","justification":"$ means US dollars."}"#,
        ]);

        let value = retriever
            .retrieve(INPUT, "Currency.", &[], true)
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("USD"));

        let (prompt, _) = &llm.calls()[0];
        assert!(prompt.contains("Valid choices: USD, EUR, GBP"));

        let records: Vec<MultipleChoiceRetrieval> = data_source.load_all(DATASET).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].valid_choices, currencies());
        assert_eq!(records[0].base.param_value.as_deref(), Some("USD"));
    }

    #[tokio::test]
    async fn test_invalid_choice_is_retried() {
        let (retriever, llm, data_source) = setup(vec![
            r#"{"success":"Y","param_value":"Dollars"}"#,
            r#"{"success":"Y","param_value":"USD"}"#,
        ]);

        let value = retriever
            .retrieve(INPUT, "Currency.", &[], true)
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("USD"));

        let calls = llm.calls();
        assert!(calls[1].0.contains("Value 'Dollars' is not one of the valid choices"));

        let records: Vec<MultipleChoiceRetrieval> = data_source.load_all(DATASET).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_choice_on_last_trial_raises() {
        let (retriever, _, _) = setup(vec![
            r#"{"success":"Y","param_value":"JPY"}"#,
            r#"{"success":"Y","param_value":"CHF"}"#,
        ]);

        let err = retriever
            .retrieve(INPUT, "Currency.", &[], true)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Extraction { .. }));
        assert!(err.to_string().contains("CHF"));
    }

    #[tokio::test]
    async fn test_optional_absent_value() {
        let (retriever, _, _) = setup(vec![r#"{"success":"N","param_value":null}"#]);

        let value = retriever
            .retrieve("Pay fixed on 5y swap", "Currency.", &[], false)
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_requires_choices() {
        let llm = Arc::new(ScriptedCompletionModel::new(Vec::<String>::new()));
        let retriever =
            MultipleChoiceRetriever::new(llm, Arc::new(CacheDataSource::new()), DATASET, vec![]);

        let result = retriever.retrieve(INPUT, "Currency.", &[], true).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
