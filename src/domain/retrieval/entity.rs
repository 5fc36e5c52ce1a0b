//! Retrieval records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::storage::{Record, RecordKey, ToPk};

/// Key of a retrieval record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RetrievalKey {
    pub retrieval_id: String,
}

impl ToPk for RetrievalKey {
    fn to_pk(&self) -> String {
        self.retrieval_id.clone()
    }
}

impl RecordKey for RetrievalKey {}

/// Input and output of one extraction trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Retrieval {
    /// Time-ordered UUID, sortable as a string
    pub retrieval_id: String,
    pub retriever_id: String,
    pub trial_id: String,
    pub input_text: String,
    pub param_description: String,
    #[serde(default)]
    pub param_samples: Vec<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub param_value: Option<String>,
    #[serde(default)]
    pub annotated_text: Option<String>,
    #[serde(default)]
    pub justification: Option<String>,
}

impl Retrieval {
    /// Fresh retrieval for one trial
    pub fn new(
        retriever_id: impl Into<String>,
        trial_id: impl Into<String>,
        input_text: impl Into<String>,
        param_description: impl Into<String>,
        param_samples: &[String],
    ) -> Self {
        Self {
            retrieval_id: Uuid::now_v7().to_string(),
            retriever_id: retriever_id.into(),
            trial_id: trial_id.into(),
            input_text: input_text.into(),
            param_description: param_description.into(),
            param_samples: param_samples.to_vec(),
            success: None,
            param_value: None,
            annotated_text: None,
            justification: None,
        }
    }

    /// Mark the trial as failed with a diagnostic
    pub fn fail(&mut self, justification: impl Into<String>) {
        self.success = Some(false);
        self.param_value = None;
        self.justification = Some(justification.into());
    }
}

/// Records that carry a [`Retrieval`] as their base
pub trait RetrievalRecord: Record {
    fn retrieval(&self) -> &Retrieval;

    fn retrieval_mut(&mut self) -> &mut Retrieval;
}

impl RetrievalRecord for Retrieval {
    fn retrieval(&self) -> &Retrieval {
        self
    }

    fn retrieval_mut(&mut self) -> &mut Retrieval {
        self
    }
}

impl Record for Retrieval {
    type Key = RetrievalKey;
    const TYPE_NAME: &'static str = "Retrieval";

    fn key(&self) -> RetrievalKey {
        RetrievalKey {
            retrieval_id: self.retrieval_id.clone(),
        }
    }
}

impl ToPk for Retrieval {
    fn to_pk(&self) -> String {
        self.get_pk()
    }
}

/// Retrieval restricted to a list of valid choices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoiceRetrieval {
    #[serde(flatten)]
    pub base: Retrieval,
    #[serde(default)]
    pub valid_choices: Vec<String>,
}

impl MultipleChoiceRetrieval {
    pub fn new(base: Retrieval, valid_choices: &[String]) -> Self {
        Self {
            base,
            valid_choices: valid_choices.to_vec(),
        }
    }
}

impl Record for MultipleChoiceRetrieval {
    type Key = RetrievalKey;
    const TYPE_NAME: &'static str = "MultipleChoiceRetrieval";

    fn type_chain() -> Vec<&'static str> {
        vec![Retrieval::TYPE_NAME, Self::TYPE_NAME]
    }

    fn key(&self) -> RetrievalKey {
        self.base.key()
    }
}

impl RetrievalRecord for MultipleChoiceRetrieval {
    fn retrieval(&self) -> &Retrieval {
        &self.base
    }

    fn retrieval_mut(&mut self) -> &mut Retrieval {
        &mut self.base
    }
}

impl ToPk for MultipleChoiceRetrieval {
    fn to_pk(&self) -> String {
        self.get_pk()
    }
}
