//! Prometheus export of analysis metrics (own process, so the global recorder is ours)

use impairscope::experiment::{analyze_pair, AnalysisOptions};
use impairscope::metrics::{install_recorder, render_metrics};
use impairscope::trace::ObservationTrace;

#[test]
fn test_analysis_metrics_are_exported() {
    let first = install_recorder().unwrap();
    let second = install_recorder().unwrap();
    assert!(std::ptr::eq(first, second));

    let sender = ObservationTrace::from_pairs([(1, 0.0), (2, 0.1), (3, 0.2), (4, 0.3)]);
    let receiver = ObservationTrace::from_pairs([(1, 0.02), (2, 0.12), (4, 0.32)]);
    analyze_pair("exported", &sender, &receiver, &AnalysisOptions::default()).unwrap();

    let text = render_metrics().unwrap();
    println!("{}", text);
    assert!(text.contains("impairscope_packets_sent_total{experiment=\"exported\"} 4"));
    assert!(text.contains("impairscope_packets_lost_total{experiment=\"exported\"} 1"));
    assert!(text.contains("impairscope_average_loss{experiment=\"exported\"} 0.25"));
    assert!(text.contains("impairscope_analysis_duration_seconds"));
}
