// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Process-wide Prometheus recorder. Installed on first use; later calls reuse
/// the same handle, so building several routers (tests) is fine.
pub struct Metrics {
    pub handle: Option<PrometheusHandle>,
}

static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

impl Metrics {
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(h) => {
                    describe_all();
                    Some(h)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "prometheus recorder not installed");
                    None
                }
            })
            .clone();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.map(|h| h.render()).unwrap_or_default() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!("llm_requests_total", "LLM calls started, by operation.");
    describe_counter!("llm_errors_total", "LLM calls that failed, by operation and kind.");
    describe_histogram!("llm_duration_ms", "LLM round-trip time in milliseconds.");
    describe_counter!("votes_recorded_total", "Votes accepted, by vote mode.");
    describe_counter!("vote_rejections_total", "Votes rejected, by vote mode.");
}
