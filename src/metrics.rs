use ::metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the in-process Prometheus recorder. Idempotent; rendering is
/// served by the HTTP server rather than a separate listener.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_ok() {
                describe_all();
                info!("Prometheus recorder installed");
            }
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Prometheus text exposition, if the recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(PrometheusHandle::render)
}

fn describe_all() {
    describe_counter!("sitemap_runs_total", "Pipeline runs started");
    describe_counter!("sitemap_run_failures_total", "Runs aborted because rows could not be fetched");
    describe_counter!("sitemap_rows_total", "Spreadsheet rows examined");
    describe_counter!("sitemap_entries_total", "Rows emitted as sitemap entries");
    describe_counter!("sitemap_rows_rejected_total", "Rows dropped, by reason");
    describe_histogram!("sitemap_run_duration_seconds", Unit::Seconds, "Duration of a full pipeline run");
}
