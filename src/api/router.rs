use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::auth;
use super::entries;
use super::health;
use super::middleware::metrics_middleware;
use super::state::AppState;
use super::storage;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the REST router
///
/// The Prometheus endpoint is mounted only when a recorder was installed. Every
/// response carries an `x-request-id`, generated when the request has none.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/auth", auth::create_auth_router())
        .nest("/entries", entries::create_entries_router())
        .nest("/storage", storage::create_storage_router())
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    let router = match metrics {
        Some(metrics) => router.merge(create_metrics_router(metrics)),
        None => router,
    };

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
