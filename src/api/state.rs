//! Application state shared by the REST handlers

use std::sync::Arc;

use crate::domain::{DataSource, RecordRegistry};

#[derive(Clone)]
pub struct AppState {
    pub data_source: Arc<dyn DataSource>,
    pub registry: Arc<RecordRegistry>,
    /// User reported by `/auth/me` when the request names none
    pub default_user: String,
    /// Dataset read when a request names none
    pub default_dataset: String,
}

impl AppState {
    pub fn new(data_source: Arc<dyn DataSource>, registry: Arc<RecordRegistry>) -> Self {
        Self {
            data_source,
            registry,
            default_user: "anonymous".to_string(),
            default_dataset: "default".to_string(),
        }
    }

    pub fn with_default_user(mut self, user: impl Into<String>) -> Self {
        self.default_user = user.into();
        self
    }

    pub fn with_default_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.default_dataset = dataset.into();
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("data_source", &self.data_source.data_source_id())
            .field("default_user", &self.default_user)
            .field("default_dataset", &self.default_dataset)
            .finish()
    }
}
