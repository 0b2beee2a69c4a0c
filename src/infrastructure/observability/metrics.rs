//! Prometheus exposition of request, answer and index build metrics

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info};

use crate::domain::answer::AnswerOutcome;

const MAX_ROUTE_LABEL: usize = 50;

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Shared handle to the installed recorder
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the process-wide recorder
///
/// `None` when disabled or when another recorder already owns the global
/// slot. The `metrics` macros then record into nothing.
pub fn init_metrics(enabled: bool) -> Option<PrometheusMetrics> {
    if !enabled {
        info!("Metrics disabled");
        return None;
    }

    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Could not install Prometheus recorder");
            return None;
        }
    };

    gauge!("rulebook_assistant_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    info!("Metrics exposed at /metrics");

    Some(PrometheusMetrics {
        handle: Arc::new(handle),
    })
}

pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

async fn render_metrics(State(metrics): State<PrometheusMetrics>) -> String {
    metrics.render()
}

pub fn record_http_request(method: &str, route: &str, status: u16, elapsed: Duration) {
    let labels = [
        ("method", method.to_owned()),
        ("path", route_label(route)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

pub fn record_answer(outcome: AnswerOutcome, cached: bool, elapsed: Duration) {
    counter!(
        "answers_total",
        "outcome" => outcome.as_str(),
        "cached" => if cached { "true" } else { "false" }
    )
    .increment(1);
    histogram!("answer_duration_seconds", "outcome" => outcome.as_str())
        .record(elapsed.as_secs_f64());
}

/// Active snapshot gauges are set by `ActiveIndex::publish`
pub fn record_index_build(succeeded: bool, elapsed: Duration) {
    let result = if succeeded { "success" } else { "failure" };

    counter!("index_builds_total", "result" => result).increment(1);
    histogram!("index_build_duration_seconds", "result" => result).record(elapsed.as_secs_f64());
}

/// Collapse numeric ids so every route maps to a bounded label set
fn route_label(path: &str) -> String {
    NUMERIC_SEGMENT
        .replace_all(path, "/{id}$1")
        .chars()
        .take(MAX_ROUTE_LABEL)
        .collect()
}
