//! Metrics recorder for trace analyses
//!
//! Records per-experiment packet counts and summary statistics.

use crate::align::Alignment;
use crate::summary::SummaryRecord;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return; // Already initialized
    }

    // Packet counters
    describe_counter!(
        "impairscope_packets_sent_total",
        "Packets observed in sender traces"
    );
    describe_counter!(
        "impairscope_packets_lost_total",
        "Sender packets never observed at the receiver"
    );
    describe_counter!(
        "impairscope_packets_delivered_total",
        "Sender packets matched at the receiver with a positive delay"
    );
    describe_counter!(
        "impairscope_pairs_excluded_total",
        "Matched pairs dropped because the receiver timestamp was not after the sender's"
    );
    describe_counter!(
        "impairscope_trailing_lost_total",
        "Sender packets marked lost after the receiver trace ended"
    );
    describe_counter!(
        "impairscope_analyses_total",
        "Trace pairs analysed"
    );

    // Summary gauges
    describe_gauge!("impairscope_average_loss", "Fraction of sender packets lost");
    describe_gauge!(
        "impairscope_average_delay_seconds",
        "Mean one-way delay of delivered packets"
    );
    describe_gauge!(
        "impairscope_jitter_seconds",
        "Peak deviation of delivered delays from their mean"
    );
    describe_gauge!(
        "impairscope_average_burst_length",
        "Mean length of consecutive-loss runs"
    );
    describe_gauge!(
        "impairscope_delay_loss_correlation",
        "Pearson correlation between delay and loss indicator"
    );

    // Histograms
    describe_histogram!(
        "impairscope_packet_delay_seconds",
        "One-way delay of delivered packets"
    );
    describe_histogram!(
        "impairscope_analysis_duration_seconds",
        "Time to align and summarise one trace pair"
    );
}

// ============== Alignment ==============

/// Record the packet-level outcome of one alignment
pub fn record_alignment(experiment: &str, sender_packets: usize, alignment: &Alignment) {
    let label = experiment.to_string();
    counter!("impairscope_packets_sent_total", "experiment" => label.clone())
        .increment(sender_packets as u64);
    counter!("impairscope_packets_lost_total", "experiment" => label.clone())
        .increment(alignment.lost_count() as u64);
    counter!("impairscope_packets_delivered_total", "experiment" => label.clone())
        .increment(alignment.delivered_count() as u64);
    counter!("impairscope_pairs_excluded_total", "experiment" => label.clone())
        .increment(alignment.excluded_non_causal as u64);
    counter!("impairscope_trailing_lost_total", "experiment" => label)
        .increment(alignment.trailing_lost as u64);

    for outcome in alignment.outcomes.iter().filter(|o| !o.lost) {
        histogram!("impairscope_packet_delay_seconds").record(outcome.delay);
    }
}

// ============== Summary ==============

/// Publish the summary statistics of one analysis
pub fn record_summary(experiment: &str, summary: &SummaryRecord) {
    let label = experiment.to_string();
    counter!("impairscope_analyses_total").increment(1);

    gauge!("impairscope_average_loss", "experiment" => label.clone()).set(summary.average_loss);
    if let Some(delay) = summary.average_delay {
        gauge!("impairscope_average_delay_seconds", "experiment" => label.clone()).set(delay);
    }
    if let Some(jitter) = summary.jitter {
        gauge!("impairscope_jitter_seconds", "experiment" => label.clone()).set(jitter);
    }
    gauge!("impairscope_average_burst_length", "experiment" => label.clone())
        .set(summary.average_burst_length);
    gauge!("impairscope_delay_loss_correlation", "experiment" => label)
        .set(summary.correlation);
}

/// Record how long one analysis took
pub fn record_analysis_duration(duration: Duration) {
    histogram!("impairscope_analysis_duration_seconds").record(duration.as_secs_f64());
}

/// Helper struct to time an analysis and record its duration
pub struct AnalysisTimer {
    start_time: Instant,
}

impl AnalysisTimer {
    pub fn start() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Stop timing and record the duration
    pub fn stop(self) {
        record_analysis_duration(self.start_time.elapsed());
    }
}
