//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_completion_cache_lookup, record_http_request,
    record_llm_request, record_retrieval_trial, LlmRequestMetricParams, MetricsConfig, PrometheusMetrics,
};
