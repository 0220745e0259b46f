//! Prometheus metrics

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use trade_query_core::{Outcome, QueryIntent};

use crate::state::AppState;

static PROMETHEUS: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

/// Install the global Prometheus recorder.
///
/// Safe to call more than once; the recorder is installed on the first call
/// and later calls return the same handle.
pub fn init_metrics() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        })
        .clone()
}

/// Record one interpreted message
pub fn record_request(intent: QueryIntent, outcome: Outcome, latency: Duration) {
    let outcome = match outcome {
        Outcome::Resolved => "resolved",
        Outcome::Partial => "partial",
        Outcome::NoMatch => "no_match",
        Outcome::General => "general",
    };
    metrics::counter!(
        "trade_query_requests_total",
        "intent" => intent.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("trade_query_latency_seconds", "intent" => intent.as_str())
        .record(latency.as_secs_f64());
}

/// Record a rejected request
pub fn record_error(kind: &'static str) {
    metrics::counter!("trade_query_errors_total", "kind" => kind).increment(1);
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) if state.get_config().observability.metrics_enabled => {
            (StatusCode::OK, handle.render())
        }
        _ => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
