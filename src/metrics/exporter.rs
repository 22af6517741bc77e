//! Prometheus metrics exporter
//!
//! Installs a Prometheus recorder so analyses can be dumped in the text
//! exposition format at the end of a run.

use crate::metrics::recorder::init_metrics;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global prometheus handle
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Can be called more than once; later calls return the existing handle.
pub fn install_recorder() -> Result<&'static PrometheusHandle, MetricsError> {
    init_metrics();

    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::SetupFailed(e.to_string()))?;

    let _ = PROMETHEUS_HANDLE.set(handle);

    PROMETHEUS_HANDLE
        .get()
        .ok_or(MetricsError::SetupFailed("handle not stored".to_string()))
}

/// Render metrics in the Prometheus text format
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

/// Errors that can occur during metrics setup
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to setup metrics: {0}")]
    SetupFailed(String),
}
