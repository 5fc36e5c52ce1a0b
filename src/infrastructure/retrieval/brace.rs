//! Retriever that reads braces from a plain-text answer

use std::sync::Arc;

use async_trait::async_trait;

use super::prompts::BRACE_TEMPLATE;
use super::trials::{TrialEvaluator, TrialRunner};
use crate::domain::cache::normalize_query;
use crate::domain::extraction::{annotated_spans, check_annotation, Retriever, TrialOutcome};
use crate::domain::llm::CompletionModel;
use crate::domain::prompt::PromptTemplate;
use crate::domain::retrieval::Retrieval;
use crate::domain::storage::DataSource;
use crate::domain::DomainError;

pub const BRACE_RETRIEVER_ID: &str = "BraceRetriever";

pub const BRACE_MAX_TRIALS: usize = 10;

/// Extracts every braced span of a model-annotated copy of the input
///
/// The model answers with the text only, no JSON. Spans are joined with `"; "`.
/// Completions are normalized, so the input is compared in normalized form.
#[derive(Debug, Clone)]
pub struct BraceRetriever {
    runner: TrialRunner,
    template: PromptTemplate,
}

impl BraceRetriever {
    pub fn new(
        llm: Arc<dyn CompletionModel>,
        data_source: Arc<dyn DataSource>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            runner: TrialRunner::new(llm, data_source, dataset, BRACE_MAX_TRIALS),
            template: BRACE_TEMPLATE.clone(),
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.runner = self.runner.with_max_trials(max_trials);
        self
    }
}

impl TrialEvaluator for BraceRetriever {
    type Record = Retrieval;

    fn retriever_id(&self) -> &str {
        BRACE_RETRIEVER_ID
    }

    fn template(&self) -> &PromptTemplate {
        &self.template
    }

    fn new_record(&self, base: Retrieval) -> Retrieval {
        base
    }

    fn evaluate(&self, record: &mut Retrieval, completion: &str) -> TrialOutcome {
        let annotated = normalize_query(completion);
        record.annotated_text = Some(annotated.clone());

        let spans = check_annotation(&record.input_text, &annotated)
            .and_then(|_| annotated_spans(&annotated));

        match spans {
            Err(e) => {
                record.fail(e.to_string());
                TrialOutcome::Violation(e.to_string())
            }
            Ok(spans) if spans.is_empty() => {
                let diagnostic = "Completion has no braces around the parameter".to_string();
                record.fail(diagnostic.clone());
                TrialOutcome::NotFound(diagnostic)
            }
            Ok(spans) => {
                let value = spans.join("; ");
                record.success = Some(true);
                record.param_value = Some(value.clone());
                TrialOutcome::Accepted(value)
            }
        }
    }
}

#[async_trait]
impl Retriever for BraceRetriever {
    fn retriever_id(&self) -> &str {
        BRACE_RETRIEVER_ID
    }

    async fn retrieve(
        &self,
        input_text: &str,
        param_description: &str,
        param_samples: &[String],
        is_required: bool,
    ) -> Result<Option<String>, DomainError> {
        self.runner
            .run(self, input_text, param_description, param_samples, is_required)
            .await
    }
}
