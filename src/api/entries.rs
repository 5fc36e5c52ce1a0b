//! Entry id endpoints

use axum::{routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::entry::{check_entry_id, get_entry_id, DEFAULT_ENTRY_TYPE};
use crate::domain::DomainError;

pub fn create_entries_router() -> Router<AppState> {
    Router::new()
        .route("/id", post(compute_entry_id))
        .route("/check", post(check_id))
}

#[derive(Debug, Deserialize)]
pub struct EntryIdRequest {
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
    pub description: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryIdResponse {
    pub entry_id: String,
}

/// POST /entries/id
pub async fn compute_entry_id(
    Json(request): Json<EntryIdRequest>,
) -> Result<Json<EntryIdResponse>, ApiError> {
    let record_type = request.record_type.as_deref().unwrap_or(DEFAULT_ENTRY_TYPE);
    let entry_id = get_entry_id(
        record_type,
        &request.description,
        request.body.as_deref(),
        request.data.as_deref(),
    )
    .map_err(DomainError::from)?;

    Ok(Json(EntryIdResponse { entry_id }))
}

#[derive(Debug, Deserialize)]
pub struct CheckEntryIdRequest {
    pub entry_id: String,
}

/// POST /entries/check
///
/// Answers 200 for a well-formed id and 400 with the reason otherwise.
pub async fn check_id(
    Json(request): Json<CheckEntryIdRequest>,
) -> Result<Json<EntryIdResponse>, ApiError> {
    check_entry_id(&request.entry_id).map_err(DomainError::from)?;

    Ok(Json(EntryIdResponse {
        entry_id: request.entry_id,
    }))
}
