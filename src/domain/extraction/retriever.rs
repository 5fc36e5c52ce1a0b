//! Retriever contract and trial decisions

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Extracts the value of one parameter from free text
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    /// Identifier stored on every retrieval record the retriever writes
    fn retriever_id(&self) -> &str;

    /// Returns `Ok(None)` when an optional parameter is absent from the text.
    /// A required parameter that cannot be extracted within the trial budget is
    /// an `Extraction` error.
    async fn retrieve(
        &self,
        input_text: &str,
        param_description: &str,
        param_samples: &[String],
        is_required: bool,
    ) -> Result<Option<String>, DomainError>;
}

/// Result of a single trial
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    /// A value was extracted
    Accepted(String),
    /// The model reported that the parameter is absent
    NotFound(String),
    /// The completion was unusable
    Failed(String),
    /// The completion broke an output rule; the next prompt gets a corrective note
    Violation(String),
}

/// What the trial loop does after a trial
#[derive(Debug, Clone, PartialEq)]
pub enum TrialStep {
    /// Stop and return this value
    Finish(Option<String>),
    Retry,
    /// Retry with the diagnostic appended to the next prompt
    RetryWithCorrection(String),
}

impl TrialOutcome {
    /// Diagnostic text of a non-accepted outcome
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::Accepted(value) => value,
            Self::NotFound(d) | Self::Failed(d) | Self::Violation(d) => d,
        }
    }

    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted(_) => "accepted",
            Self::NotFound(_) => "not_found",
            Self::Failed(_) => "failed",
            Self::Violation(_) => "violation",
        }
    }

    /// Decide the next step for trial `trial` (zero-based) out of `max_trials`
    ///
    /// An optional parameter that is not found ends the loop with `None`. Rule
    /// violations are retried even for optional parameters, and after the last
    /// trial every non-accepted outcome of a required parameter is an
    /// `Extraction` error carrying the diagnostic.
    pub fn next_step(
        self,
        retriever_id: &str,
        trial: usize,
        max_trials: usize,
        is_required: bool,
    ) -> Result<TrialStep, DomainError> {
        let is_last = trial + 1 >= max_trials;

        match self {
            Self::Accepted(value) => Ok(TrialStep::Finish(Some(value))),
            Self::NotFound(_) | Self::Failed(_) if !is_required => Ok(TrialStep::Finish(None)),
            outcome if is_last => Err(DomainError::extraction(format!(
                "{} could not extract the parameter in {} trial(s): {}",
                retriever_id,
                max_trials,
                outcome.diagnostic()
            ))),
            Self::Violation(diagnostic) => Ok(TrialStep::RetryWithCorrection(diagnostic)),
            _ => Ok(TrialStep::Retry),
        }
    }
}
