use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe the crate's series.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("harvest_requests_total", "Outbound PNCP requests, retries included.");
        describe_counter!("harvest_retries_total", "Requests retried after a transient failure.");
        describe_counter!("harvest_failures_total", "Requests that failed for good.");
        describe_counter!("harvest_pages_total", "Non-empty pages harvested.");
        describe_counter!("search_queries_total", "Validated price-research queries.");

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
