//! Metrics and observability module
//!
//! Provides Prometheus-compatible metrics for trace analyses.
//!
//! Key metrics exposed:
//! - Packet counts (sent, lost, delivered, excluded, trailing lost)
//! - Delay distribution of delivered packets
//! - Per-experiment summary statistics

pub mod exporter;
pub mod recorder;

pub use exporter::{install_recorder, render_metrics, MetricsError};
pub use recorder::{init_metrics, record_alignment, record_summary, AnalysisTimer};
