//! Alignment and summary behaviour on hand-built trace pairs

use impairscope::align::{align, Aligner, OutcomeRecord};
use impairscope::summary::{
    average_delay, average_loss, average_loss_burst_length, correlation, jitter, Summarizer,
    SummaryError,
};
use impairscope::trace::ObservationTrace;

fn trace(pairs: &[(u64, f64)]) -> ObservationTrace {
    ObservationTrace::from_pairs(pairs.iter().copied())
}

#[test]
fn test_lost_packet_between_deliveries() {
    let sender = trace(&[(1, 0.0), (2, 0.1), (3, 0.2)]);
    let receiver = trace(&[(1, 0.05), (3, 0.25)]);

    let outcomes = align(&sender, &receiver, -1.0);

    assert_eq!(outcomes.len(), 3);
    assert!(!outcomes[0].lost);
    assert!((outcomes[0].delay - 0.05).abs() < 1e-9);
    assert_eq!(outcomes[1], OutcomeRecord::lost(-1.0));
    assert!(!outcomes[2].lost);
    assert!((outcomes[2].delay - 0.05).abs() < 1e-9);
}

#[test]
fn test_receiver_before_sender_is_silently_dropped() {
    let sender = trace(&[(1, 1.0)]);
    let receiver = trace(&[(1, 0.5)]);

    let alignment = Aligner::new().align(&sender, &receiver, -1.0);
    assert_eq!(alignment.len(), 0);
    assert_eq!(alignment.excluded_non_causal, 1);

    // Nothing left to summarise
    assert_eq!(
        Summarizer::summarize(&alignment.outcomes),
        Err(SummaryError::EmptyOutcomes)
    );
}

#[test]
fn test_receiver_trace_ending_early() {
    let sender = trace(&[(1, 0.0), (2, 0.1), (3, 0.2), (4, 0.3)]);
    let receiver = trace(&[(1, 0.04), (2, 0.15)]);

    let alignment = Aligner::new().align(&sender, &receiver, 0.2);
    assert_eq!(alignment.len(), sender.len());
    assert_eq!(alignment.losses(), vec![false, false, true, true]);
    assert_eq!(alignment.trailing_lost, 2);

    let truncated = Aligner::new()
        .with_trailing_loss(false)
        .align(&sender, &receiver, 0.2);
    assert_eq!(truncated.len(), 2);
}

#[test]
fn test_outcome_count_matches_sender() {
    // Every sender packet gets exactly one outcome when all delays are positive
    let sender = ObservationTrace::from_pairs((1..=50u64).map(|s| (s, s as f64 * 0.01)));
    let receiver = ObservationTrace::from_pairs(
        (1..=50u64)
            .filter(|s| s % 7 != 0)
            .map(|s| (s, s as f64 * 0.01 + 0.003)),
    );

    let alignment = Aligner::new().align(&sender, &receiver, -1.0);
    assert_eq!(alignment.len(), sender.len());
    assert_eq!(alignment.lost_count(), 7);
}

#[test]
fn test_summary_properties() {
    let sender = ObservationTrace::from_pairs((1..=20u64).map(|s| (s, s as f64 * 0.1)));
    let receiver = ObservationTrace::from_pairs(
        [1u64, 2, 5, 6, 7, 12, 13, 14, 15, 20]
            .iter()
            .map(|&s| (s, s as f64 * 0.1 + 0.02 + (s % 3) as f64 * 0.001)),
    );

    let outcomes = align(&sender, &receiver, 1.0);
    let delays: Vec<f64> = outcomes.iter().map(|o| o.delay).collect();
    let losses: Vec<bool> = outcomes.iter().map(|o| o.lost).collect();

    let loss = average_loss(&losses).unwrap();
    assert!((0.0..=1.0).contains(&loss));
    assert!((loss - 0.5).abs() < 1e-12);

    // Mean of exactly the delivered delays, sentinel 1.0 never included
    let delivered: Vec<f64> = outcomes.iter().filter(|o| !o.lost).map(|o| o.delay).collect();
    let expected = delivered.iter().sum::<f64>() / delivered.len() as f64;
    assert!((average_delay(&delays, &losses).unwrap() - expected).abs() < 1e-12);

    let j = jitter(&delays, &losses, None).unwrap();
    assert!(j >= 0.0 && j < 0.003);

    // Losses: 3-4, 8-11, 16-19
    assert!((average_loss_burst_length(&losses) - (2.0 + 4.0 + 4.0) / 3.0).abs() < 1e-12);

    let r = correlation(&delays, &losses).unwrap();
    assert!(r > 0.9, "sentinel above every delay should correlate, r = {}", r);
}

#[test]
fn test_degenerate_correlation() {
    let two = vec![OutcomeRecord::delivered(0.1), OutcomeRecord::lost(-1.0)];
    assert_eq!(Summarizer::summarize(&two).unwrap().correlation, 0.0);

    let no_loss: Vec<OutcomeRecord> = [0.01, 0.05, 0.02, 0.08]
        .iter()
        .map(|&d| OutcomeRecord::delivered(d))
        .collect();
    assert_eq!(Summarizer::summarize(&no_loss).unwrap().correlation, 0.0);

    let all_lost = vec![OutcomeRecord::lost(-1.0); 5];
    assert_eq!(Summarizer::summarize(&all_lost).unwrap().correlation, 0.0);
}

#[test]
fn test_repeated_runs_are_bit_identical() {
    let sender = ObservationTrace::from_pairs((1..=200u64).map(|s| (s, s as f64 * 0.013)));
    let receiver = ObservationTrace::from_pairs(
        (1..=200u64)
            .filter(|s| s % 5 != 0 && s % 11 != 0)
            .map(|s| (s, s as f64 * 0.013 + 0.021 + (s % 4) as f64 * 0.0007)),
    );

    let first = align(&sender, &receiver, 0.03);
    let second = align(&sender, &receiver, 0.03);
    assert_eq!(first, second);

    let a = Summarizer::summarize(&first).unwrap();
    let b = Summarizer::summarize(&second).unwrap();
    assert_eq!(a.average_loss.to_bits(), b.average_loss.to_bits());
    assert_eq!(
        a.average_delay.unwrap().to_bits(),
        b.average_delay.unwrap().to_bits()
    );
    assert_eq!(a.jitter.unwrap().to_bits(), b.jitter.unwrap().to_bits());
    assert_eq!(a.correlation.to_bits(), b.correlation.to_bits());
}
