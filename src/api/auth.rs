//! Identity endpoints

use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::api::types::Json;
use crate::domain::storage::RecordTypeSummary;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/types", get(list_record_types))
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: String,
}

/// GET /auth/me
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse { user })
}

/// GET /auth/types
///
/// Record types the storage endpoint can load, sorted by name.
pub async fn list_record_types(State(state): State<AppState>) -> Json<Vec<RecordTypeSummary>> {
    Json(state.registry.types())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::api::test_support::{body_json, test_router};

    #[tokio::test]
    async fn test_me_uses_header() {
        let (router, _) = test_router();
        let response = router
            .oneshot(
                Request::get("/auth/me")
                    .header("x-user", "alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["user"], "alice");
    }

    #[tokio::test]
    async fn test_me_falls_back_to_default_user() {
        let (router, _) = test_router();
        let response = router
            .oneshot(Request::get("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(body_json(response).await["user"], "tester");
    }

    #[tokio::test]
    async fn test_types_lists_registry() {
        let (router, _) = test_router();
        let response = router
            .oneshot(Request::get("/auth/types").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let types = json.as_array().unwrap();
        assert_eq!(types.len(), 4);
        assert_eq!(types[2]["name"], "MultipleChoiceRetrieval");
        assert_eq!(
            types[2]["type_chain"],
            serde_json::json!(["Retrieval", "MultipleChoiceRetrieval"])
        );
    }
}
