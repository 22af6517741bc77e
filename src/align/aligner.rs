use crate::align::error::{AlignError, AlignResult};
use crate::align::types::{Alignment, OutcomeRecord};
use crate::trace::{CaptureSide, ObservationTrace};

/// Two-cursor merge of a sender trace against a receiver trace
#[derive(Debug, Clone, Copy)]
pub struct Aligner {
    mark_trailing_lost: bool,
}

impl Default for Aligner {
    fn default() -> Self {
        Self {
            mark_trailing_lost: true,
        }
    }
}

impl Aligner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether sender packets left over after the receiver trace ends count as lost.
    /// Disabling reproduces the older truncating behaviour.
    pub fn with_trailing_loss(mut self, enabled: bool) -> Self {
        self.mark_trailing_lost = enabled;
        self
    }

    pub fn marks_trailing_lost(&self) -> bool {
        self.mark_trailing_lost
    }

    /// Align two traces without validating their ordering.
    ///
    /// Both traces must be ordered by sequence number; unordered input gives a
    /// wrong but well-defined result. A matched pair whose delay is not positive
    /// is dropped from the outcomes and counted in `excluded_non_causal`.
    pub fn align(
        &self,
        sender: &ObservationTrace,
        receiver: &ObservationTrace,
        max_delay: f64,
    ) -> Alignment {
        let src = sender.as_slice();
        let dst = receiver.as_slice();

        let mut alignment = Alignment {
            outcomes: Vec::with_capacity(src.len()),
            ..Default::default()
        };
        let mut src_idx = 0;
        let mut dst_idx = 0;

        while src_idx < src.len() && dst_idx < dst.len() {
            let sent = &src[src_idx];
            let received = &dst[dst_idx];

            if received.sequence_number > sent.sequence_number {
                alignment.outcomes.push(OutcomeRecord::lost(max_delay));
                src_idx += 1;
                continue;
            }

            if received.sequence_number < sent.sequence_number {
                alignment.misaligned_pairs += 1;
            }

            let delay = received.timestamp - sent.timestamp;
            if delay > 0.0 {
                alignment.outcomes.push(OutcomeRecord::delivered(delay));
            } else {
                alignment.excluded_non_causal += 1;
            }
            src_idx += 1;
            dst_idx += 1;
        }

        if self.mark_trailing_lost {
            let remaining = src.len() - src_idx;
            alignment
                .outcomes
                .extend(std::iter::repeat(OutcomeRecord::lost(max_delay)).take(remaining));
            alignment.trailing_lost = remaining;
        }
        alignment.unmatched_receiver = dst.len() - dst_idx;

        if alignment.excluded_non_causal > 0 {
            tracing::warn!(
                "dropped {} non-causal pairs (receiver timestamp not after sender)",
                alignment.excluded_non_causal
            );
        }
        if alignment.misaligned_pairs > 0 {
            tracing::warn!(
                "{} pairs matched against a lower receiver sequence number; traces may be unordered",
                alignment.misaligned_pairs
            );
        }
        tracing::debug!(
            sender = src.len(),
            receiver = dst.len(),
            outcomes = alignment.outcomes.len(),
            lost = alignment.lost_count(),
            trailing_lost = alignment.trailing_lost,
            unmatched_receiver = alignment.unmatched_receiver,
            "alignment complete"
        );

        alignment
    }

    /// Align after checking the max-delay sentinel and both traces' ordering
    pub fn align_checked(
        &self,
        sender: &ObservationTrace,
        receiver: &ObservationTrace,
        max_delay: f64,
    ) -> AlignResult<Alignment> {
        if max_delay.is_nan() {
            return Err(AlignError::InvalidMaxDelay(max_delay));
        }
        check_ordering(sender, CaptureSide::Sender)?;
        check_ordering(receiver, CaptureSide::Receiver)?;
        Ok(self.align(sender, receiver, max_delay))
    }
}

fn check_ordering(trace: &ObservationTrace, side: CaptureSide) -> AlignResult<()> {
    trace
        .validate_ordering()
        .map_err(|violation| AlignError::UnorderedTrace {
            side,
            index: violation.index,
            previous: violation.previous,
            current: violation.current,
        })
}

/// Align with default settings and return just the outcomes
pub fn align(
    sender: &ObservationTrace,
    receiver: &ObservationTrace,
    max_delay: f64,
) -> Vec<OutcomeRecord> {
    Aligner::default()
        .align(sender, receiver, max_delay)
        .into_outcomes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(pairs: &[(u64, f64)]) -> ObservationTrace {
        ObservationTrace::from_pairs(pairs.iter().copied())
    }

    fn assert_outcomes(actual: &[OutcomeRecord], expected: &[(f64, bool)]) {
        assert_eq!(actual.len(), expected.len(), "outcomes: {:?}", actual);
        for (got, &(delay, lost)) in actual.iter().zip(expected) {
            assert_eq!(got.lost, lost);
            assert!(
                (got.delay - delay).abs() < 1e-9,
                "delay {} != {}",
                got.delay,
                delay
            );
        }
    }

    #[test]
    fn test_single_loss_in_middle() {
        let sender = trace(&[(1, 0.0), (2, 0.1), (3, 0.2)]);
        let receiver = trace(&[(1, 0.05), (3, 0.25)]);

        let outcomes = align(&sender, &receiver, -1.0);
        assert_outcomes(&outcomes, &[(0.05, false), (-1.0, true), (0.05, false)]);
    }

    #[test]
    fn test_non_causal_pair_is_dropped() {
        let sender = trace(&[(1, 1.0)]);
        let receiver = trace(&[(1, 0.5)]);

        let alignment = Aligner::new().align(&sender, &receiver, -1.0);
        assert!(alignment.is_empty());
        assert_eq!(alignment.excluded_non_causal, 1);
        assert_eq!(alignment.trailing_lost, 0);
    }

    #[test]
    fn test_zero_delay_is_dropped() {
        let sender = trace(&[(1, 1.0), (2, 2.0)]);
        let receiver = trace(&[(1, 1.0), (2, 2.5)]);

        let alignment = Aligner::new().align(&sender, &receiver, -1.0);
        assert_outcomes(&alignment.outcomes, &[(0.5, false)]);
        assert_eq!(alignment.excluded_non_causal, 1);
    }

    #[test]
    fn test_trailing_sender_packets_marked_lost() {
        let sender = trace(&[(1, 0.0), (2, 0.1), (3, 0.2)]);
        let receiver = trace(&[(1, 0.05)]);

        let alignment = Aligner::new().align(&sender, &receiver, 0.5);
        assert_outcomes(&alignment.outcomes, &[(0.05, false), (0.5, true), (0.5, true)]);
        assert_eq!(alignment.trailing_lost, 2);
    }

    #[test]
    fn test_trailing_truncation_when_disabled() {
        let sender = trace(&[(1, 0.0), (2, 0.1), (3, 0.2)]);
        let receiver = trace(&[(1, 0.05)]);

        let alignment = Aligner::new()
            .with_trailing_loss(false)
            .align(&sender, &receiver, 0.5);
        assert_outcomes(&alignment.outcomes, &[(0.05, false)]);
        assert_eq!(alignment.trailing_lost, 0);
    }

    #[test]
    fn test_empty_receiver_loses_everything() {
        let sender = trace(&[(1, 0.0), (2, 0.1)]);
        let receiver = ObservationTrace::default();

        let outcomes = align(&sender, &receiver, -1.0);
        assert_outcomes(&outcomes, &[(-1.0, true), (-1.0, true)]);
    }

    #[test]
    fn test_empty_sender() {
        let receiver = trace(&[(1, 0.05), (2, 0.15)]);
        let alignment = Aligner::new().align(&ObservationTrace::default(), &receiver, -1.0);

        assert!(alignment.is_empty());
        assert_eq!(alignment.unmatched_receiver, 2);
    }

    #[test]
    fn test_burst_loss() {
        let sender = trace(&[(1, 0.0), (2, 0.1), (3, 0.2), (4, 0.3), (5, 0.4)]);
        let receiver = trace(&[(1, 0.02), (5, 0.43)]);

        let alignment = Aligner::new().align(&sender, &receiver, -1.0);
        assert_eq!(alignment.losses(), vec![false, true, true, true, false]);
        assert_eq!(alignment.misaligned_pairs, 0);
    }

    #[test]
    fn test_lower_receiver_sequence_counts_as_match() {
        let sender = trace(&[(2, 0.0), (3, 0.1)]);
        let receiver = trace(&[(1, 0.05), (3, 0.12)]);

        let alignment = Aligner::new().align(&sender, &receiver, -1.0);
        assert_eq!(alignment.len(), 2);
        assert_eq!(alignment.lost_count(), 0);
        assert_eq!(alignment.misaligned_pairs, 1);
    }

    #[test]
    fn test_align_checked_rejects_unordered_receiver() {
        let sender = trace(&[(1, 0.0), (2, 0.1)]);
        let receiver = trace(&[(2, 0.15), (1, 0.2)]);

        let err = Aligner::new()
            .align_checked(&sender, &receiver, -1.0)
            .unwrap_err();
        assert_eq!(
            err,
            AlignError::UnorderedTrace {
                side: CaptureSide::Receiver,
                index: 1,
                previous: 2,
                current: 1,
            }
        );
    }

    #[test]
    fn test_align_checked_reports_sender_side_first() {
        // Both sides unordered; the sender is checked first and its violation is kept
        let sender = trace(&[(1, 0.0), (5, 0.1), (4, 0.2)]);
        let receiver = trace(&[(3, 0.15), (2, 0.2)]);

        let err = Aligner::new()
            .align_checked(&sender, &receiver, -1.0)
            .unwrap_err();
        assert_eq!(
            err,
            AlignError::UnorderedTrace {
                side: CaptureSide::Sender,
                index: 2,
                previous: 5,
                current: 4,
            }
        );
        assert!(err.to_string().starts_with("sender trace"));
    }

    #[test]
    fn test_align_checked_rejects_nan_sentinel() {
        let sender = trace(&[(1, 0.0)]);
        let result = Aligner::new().align_checked(&sender, &sender, f64::NAN);
        assert!(matches!(result, Err(AlignError::InvalidMaxDelay(_))));
    }

    #[test]
    fn test_alignment_is_deterministic() {
        let sender = trace(&[(1, 0.0), (2, 0.1), (3, 0.2), (4, 0.3)]);
        let receiver = trace(&[(2, 0.13), (4, 0.31)]);

        let first = Aligner::new().align(&sender, &receiver, 0.04);
        let second = Aligner::new().align(&sender, &receiver, 0.04);
        assert_eq!(first, second);
    }
}
