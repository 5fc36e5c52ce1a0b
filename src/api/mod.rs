//! API layer - HTTP endpoints and extractors

pub mod auth;
pub mod entries;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod storage;
pub mod types;

pub use router::create_router;
pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{response::Response, Router};

    use super::{create_router, AppState};
    use crate::domain::RecordRegistry;
    use crate::infrastructure::storage::CacheDataSource;

    /// Router over an empty in-memory data source, without metrics
    pub fn test_router() -> (Router, Arc<CacheDataSource>) {
        let data_source = Arc::new(CacheDataSource::new());
        let state = AppState::new(
            data_source.clone(),
            Arc::new(RecordRegistry::with_builtin_types()),
        )
        .with_default_user("tester")
        .with_default_dataset("default");

        (create_router(state, None), data_source)
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
