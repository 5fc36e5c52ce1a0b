//! Record lookup endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

pub fn create_storage_router() -> Router<AppState> {
    Router::new().route("/record", get(get_record))
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordQuery {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub key: Option<String>,
    pub dataset: Option<String>,
}

fn required(value: Option<String>, param: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ApiError::bad_request(format!("Query parameter '{}' is required", param))
                .with_param(param)
        })
}

/// GET /storage/record?type=&key=&dataset=
///
/// Returns the dict form of the stored record, rebuilt as the leaf type of its
/// type chain. A record stored under the key with an unrelated type counts as
/// absent.
pub async fn get_record(
    State(state): State<AppState>,
    Query(query): Query<RecordQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let record_type = required(query.record_type, "type")?;
    let key = required(query.key, "key")?;
    let dataset = query
        .dataset
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| state.default_dataset.clone());

    if state.registry.get(&record_type).is_none() {
        return Err(
            ApiError::bad_request(format!("Unknown record type '{}'", record_type))
                .with_param("type"),
        );
    }

    let not_found = || {
        ApiError::not_found(format!(
            "{} '{}' not found in dataset '{}'",
            record_type, key, dataset
        ))
    };

    let stored = state
        .data_source
        .load_raw(&dataset, &key)
        .await?
        .ok_or_else(not_found)?;

    if !stored.contains_type(&record_type) {
        return Err(not_found());
    }

    debug!(
        record_type = %record_type,
        leaf_type = %stored.leaf_type(),
        dataset = %dataset,
        "Loaded record"
    );

    let dict = state.registry.reconstruct(stored, &key)?;

    Ok(Json(dict))
}
