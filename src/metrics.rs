use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Counters and histograms recorded by the scoring pipeline.
pub const SERIES: [&str; 7] = [
    "rubric_scored_total",
    "rubric_rejected_total",
    "rubric_fabricated_total",
    "rubric_total_score",
    "stance_classified_total",
    "stance_fallback_total",
    "stance_short_evidence_total",
];

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        for name in SERIES.iter().filter(|n| n.ends_with("_total")) {
            metrics::describe_counter!(*name, "evidence scoring engine counter");
        }
        metrics::describe_histogram!("rubric_total_score", "distribution of final rubric scores");

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
