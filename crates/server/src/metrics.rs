//! Prometheus metrics

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use parking_lot::Mutex;
use std::sync::OnceLock;

static PROMETHEUS_HANDLE: OnceLock<Mutex<Option<PrometheusHandle>>> = OnceLock::new();

/// Install the Prometheus recorder
///
/// Call once at startup, before any counters are touched. Safe to call
/// again (subsequent installs are ignored), which keeps tests simple.
pub fn init_metrics() {
    let slot = PROMETHEUS_HANDLE.get_or_init(|| Mutex::new(None));
    let mut guard = slot.lock();
    if guard.is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => *guard = Some(handle),
        Err(e) => tracing::warn!(error = %e, "metrics recorder not installed"),
    }
}

/// `/metrics` endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let rendered = PROMETHEUS_HANDLE
        .get()
        .and_then(|slot| slot.lock().as_ref().map(|h| h.render()))
        .unwrap_or_default();
    rendered
}

/// Count one handled HTTP request
pub fn record_request(route: &'static str) {
    metrics::counter!("lexai_requests_total", "route" => route).increment(1);
}
