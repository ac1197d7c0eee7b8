use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::strength_index::StrengthIndex;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and publish a static
    /// gauge with the number of seasons in the strength table.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        describe_counter!(
            "h2h_compare_requests_total",
            "Comparison requests served, by route."
        );
        gauge!("h2h_strength_index_seasons").set(StrengthIndex::shipped().season_count() as f64);

        Ok(Self { handle })
    }

    /// `/metrics` in Prometheus text format, merged next to the comparison routes.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || std::future::ready(handle.render())),
        )
    }
}
