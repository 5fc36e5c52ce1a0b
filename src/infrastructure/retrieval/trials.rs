//! Bounded trial loop shared by the retrievers

use std::sync::Arc;

use tracing::{debug, warn};

use super::prompts::corrective_note;
use crate::domain::cache::normalize_query;
use crate::domain::extraction::{TrialOutcome, TrialStep};
use crate::domain::llm::CompletionModel;
use crate::domain::prompt::{record_variables, PromptTemplate};
use crate::domain::retrieval::{Retrieval, RetrievalRecord};
use crate::domain::storage::{DataSource, DataSourceExt};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_retrieval_trial;

/// Retriever-specific parts of a trial
pub(crate) trait TrialEvaluator: Send + Sync {
    type Record: RetrievalRecord;

    fn retriever_id(&self) -> &str;

    fn template(&self) -> &PromptTemplate;

    /// Record for one trial built around its base retrieval
    fn new_record(&self, base: Retrieval) -> Self::Record;

    /// Fill the record from the completion and classify the trial
    fn evaluate(&self, record: &mut Self::Record, completion: &str) -> TrialOutcome;
}

/// Runs trials against a completion model and persists one record per trial
#[derive(Debug, Clone)]
pub struct TrialRunner {
    llm: Arc<dyn CompletionModel>,
    data_source: Arc<dyn DataSource>,
    dataset: String,
    max_trials: usize,
}

impl TrialRunner {
    pub fn new(
        llm: Arc<dyn CompletionModel>,
        data_source: Arc<dyn DataSource>,
        dataset: impl Into<String>,
        max_trials: usize,
    ) -> Self {
        Self {
            llm,
            data_source,
            dataset: dataset.into(),
            max_trials: max_trials.max(1),
        }
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials.max(1);
        self
    }

    pub fn max_trials(&self) -> usize {
        self.max_trials
    }

    pub(crate) async fn run<E: TrialEvaluator>(
        &self,
        evaluator: &E,
        input_text: &str,
        param_description: &str,
        param_samples: &[String],
        is_required: bool,
    ) -> Result<Option<String>, DomainError> {
        let retriever_id = evaluator.retriever_id();
        // Records and annotation checks see the same text the model is sent
        let input_text = normalize_query(input_text);
        let mut correction: Option<String> = None;

        for trial in 0..self.max_trials {
            let trial_id = trial.to_string();
            let mut record = evaluator.new_record(Retrieval::new(
                retriever_id,
                &trial_id,
                &input_text,
                param_description,
                param_samples,
            ));

            let rendered = record_variables(&record)
                .and_then(|variables| evaluator.template().render(&variables));

            let mut prompt = match rendered {
                Ok(prompt) => prompt,
                Err(e) => {
                    let e = DomainError::from(e);
                    record.retrieval_mut().fail(e.to_string());
                    self.data_source.save_one(&record, &self.dataset).await?;
                    return Err(e);
                }
            };

            if let Some(diagnostic) = correction.take() {
                prompt.push_str(&corrective_note(&diagnostic));
            }

            debug!(retriever = retriever_id, trial, "Running retrieval trial");

            let completion = match self.llm.completion(&prompt, Some(&trial_id)).await {
                Ok(completion) => completion,
                Err(e) => {
                    record.retrieval_mut().fail(e.to_string());
                    self.data_source.save_one(&record, &self.dataset).await?;
                    return Err(e);
                }
            };

            let outcome = evaluator.evaluate(&mut record, &completion);
            record_retrieval_trial(retriever_id, outcome.label());
            self.data_source.save_one(&record, &self.dataset).await?;

            if !matches!(outcome, TrialOutcome::Accepted(_)) {
                warn!(
                    retriever = retriever_id,
                    trial,
                    outcome = outcome.label(),
                    diagnostic = outcome.diagnostic(),
                    "Retrieval trial did not produce a value"
                );
            }

            match outcome.next_step(retriever_id, trial, self.max_trials, is_required)? {
                TrialStep::Finish(value) => return Ok(value),
                TrialStep::Retry => {}
                TrialStep::RetryWithCorrection(diagnostic) => correction = Some(diagnostic),
            }
        }

        Err(DomainError::internal(format!(
            "{} finished without running a trial",
            retriever_id
        )))
    }
}
