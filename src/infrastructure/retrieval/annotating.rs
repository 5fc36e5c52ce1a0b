//! Retriever that asks the model to annotate the parameter in the input text

use std::sync::Arc;

use async_trait::async_trait;

use super::prompts::ANNOTATING_TEMPLATE;
use super::trials::{TrialEvaluator, TrialRunner};
use crate::domain::extraction::{
    annotated_spans, check_annotation, extract_json_object, parse_flag, string_field, Retriever,
    TrialOutcome,
};
use crate::domain::llm::CompletionModel;
use crate::domain::prompt::PromptTemplate;
use crate::domain::retrieval::Retrieval;
use crate::domain::storage::DataSource;
use crate::domain::DomainError;

pub const ANNOTATING_RETRIEVER_ID: &str = "AnnotatingRetriever";

/// Trial budget of the annotating retriever
pub const ANNOTATING_MAX_TRIALS: usize = 2;

/// Extracts a parameter by having the model wrap it in braces inside a JSON answer
///
/// The annotated text must reproduce the input once markup is removed. Spans
/// are joined with a space.
#[derive(Debug, Clone)]
pub struct AnnotatingRetriever {
    runner: TrialRunner,
    template: PromptTemplate,
}

impl AnnotatingRetriever {
    pub fn new(
        llm: Arc<dyn CompletionModel>,
        data_source: Arc<dyn DataSource>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            runner: TrialRunner::new(llm, data_source, dataset, ANNOTATING_MAX_TRIALS),
            template: ANNOTATING_TEMPLATE.clone(),
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

impl TrialEvaluator for AnnotatingRetriever {
    type Record = Retrieval;

    fn retriever_id(&self) -> &str {
        ANNOTATING_RETRIEVER_ID
    }

    fn template(&self) -> &PromptTemplate {
        &self.template
    }

    fn new_record(&self, base: Retrieval) -> Retrieval {
        base
    }

    fn evaluate(&self, record: &mut Retrieval, completion: &str) -> TrialOutcome {
        let Some(json) = extract_json_object(completion) else {
            let diagnostic = format!("Completion does not contain a JSON object: {}", completion);
            record.fail(diagnostic.clone());
            return TrialOutcome::Failed(diagnostic);
        };

        record.annotated_text = string_field(&json, "annotated_text");
        record.justification = string_field(&json, "justification");

        if json.get("success").and_then(parse_flag) != Some(true) {
            record.success = Some(false);
            return TrialOutcome::NotFound(
                record
                    .justification
                    .clone()
                    .unwrap_or_else(|| "Model reported that the parameter is absent".to_string()),
            );
        }

        let Some(annotated) = record.annotated_text.clone() else {
            let diagnostic = "Completion reports success but has no annotated_text".to_string();
            record.fail(diagnostic.clone());
            return TrialOutcome::Failed(diagnostic);
        };

        let spans = check_annotation(&record.input_text, &annotated)
            .and_then(|_| annotated_spans(&annotated));

        match spans {
            Err(e) => {
                record.fail(e.to_string());
                TrialOutcome::Violation(e.to_string())
            }
            Ok(spans) if spans.is_empty() => {
                let diagnostic = "Annotated text has no braces around the parameter".to_string();
                record.fail(diagnostic.clone());
                TrialOutcome::NotFound(diagnostic)
            }
            Ok(spans) => {
                let value = spans.join(" ");
                record.success = Some(true);
                record.param_value = Some(value.clone());
                TrialOutcome::Accepted(value)
            }
        }
    }
}

#[async_trait]
impl Retriever for AnnotatingRetriever {
    fn retriever_id(&self) -> &str {
        ANNOTATING_RETRIEVER_ID
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
