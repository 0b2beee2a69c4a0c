//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use self::metrics::{
    create_metrics_router, init_metrics, record_answer, record_http_request,
    record_index_build, PrometheusMetrics,
};
