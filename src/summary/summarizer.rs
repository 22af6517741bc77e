use crate::align::OutcomeRecord;
use crate::summary::error::{SummaryError, SummaryResult};
use crate::summary::stats;
use crate::summary::types::SummaryRecord;

pub struct Summarizer;

impl Summarizer {
    /// Compute all five statistics over an outcome sequence.
    ///
    /// Fails only on an empty sequence. When every packet was lost the delay
    /// and jitter fields are `None`.
    pub fn summarize(outcomes: &[OutcomeRecord]) -> SummaryResult<SummaryRecord> {
        let delays: Vec<f64> = outcomes.iter().map(|o| o.delay).collect();
        let losses: Vec<bool> = outcomes.iter().map(|o| o.lost).collect();
        Self::summarize_series(&delays, &losses)
    }

    /// Same as [`Summarizer::summarize`] over parallel delay/loss slices
    pub fn summarize_series(delays: &[f64], losses: &[bool]) -> SummaryResult<SummaryRecord> {
        if delays.len() != losses.len() {
            return Err(SummaryError::LengthMismatch {
                delays: delays.len(),
                losses: losses.len(),
            });
        }

        let average_loss = stats::average_loss(losses)?;
        let average_delay = no_data_as_none(stats::average_delay(delays, losses))?;
        let jitter = match average_delay {
            Some(mean) => Some(stats::jitter(delays, losses, Some(mean))?),
            None => None,
        };

        let record = SummaryRecord {
            average_loss,
            average_delay,
            jitter,
            average_burst_length: stats::average_loss_burst_length(losses),
            correlation: stats::correlation(delays, losses)?,
        };
        tracing::debug!("summary over {} outcomes: {}", losses.len(), record);
        Ok(record)
    }
}

fn no_data_as_none(result: SummaryResult<f64>) -> SummaryResult<Option<f64>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(SummaryError::NoDeliveredPackets) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_mixed() {
        let outcomes = vec![
            OutcomeRecord::delivered(0.020),
            OutcomeRecord::lost(0.05),
            OutcomeRecord::lost(0.05),
            OutcomeRecord::delivered(0.030),
            OutcomeRecord::delivered(0.040),
            OutcomeRecord::lost(0.05),
        ];

        let summary = Summarizer::summarize(&outcomes).unwrap();
        assert!((summary.average_loss - 0.5).abs() < 1e-12);
        assert!((summary.average_delay.unwrap() - 0.030).abs() < 1e-12);
        assert!((summary.jitter.unwrap() - 0.010).abs() < 1e-12);
        assert!((summary.average_burst_length - 1.5).abs() < 1e-12);
        assert!(summary.correlation > 0.0);
        println!("Summary: {}", summary);
    }

    #[test]
    fn test_summarize_all_lost() {
        let outcomes = vec![OutcomeRecord::lost(-1.0); 4];
        let summary = Summarizer::summarize(&outcomes).unwrap();

        assert_eq!(summary.average_loss, 1.0);
        assert_eq!(summary.average_delay, None);
        assert_eq!(summary.jitter, None);
        assert_eq!(summary.average_burst_length, 4.0);
        assert_eq!(summary.correlation, 0.0);
    }

    #[test]
    fn test_summarize_no_losses() {
        let outcomes = vec![
            OutcomeRecord::delivered(0.25),
            OutcomeRecord::delivered(0.25),
            OutcomeRecord::delivered(0.25),
        ];
        let summary = Summarizer::summarize(&outcomes).unwrap();

        assert_eq!(summary.average_loss, 0.0);
        assert_eq!(summary.average_delay, Some(0.25));
        assert_eq!(summary.jitter, Some(0.0));
        assert_eq!(summary.average_burst_length, 0.0);
        assert_eq!(summary.correlation, 0.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(
            Summarizer::summarize(&[]),
            Err(SummaryError::EmptyOutcomes)
        );
    }

    #[test]
    fn test_summarize_series_mismatch() {
        let result = Summarizer::summarize_series(&[0.1], &[false, true]);
        assert!(matches!(result, Err(SummaryError::LengthMismatch { .. })));
    }

    #[test]
    fn test_summary_display() {
        let outcomes = vec![OutcomeRecord::lost(-1.0)];
        let text = Summarizer::summarize(&outcomes).unwrap().to_string();
        assert!(text.contains("delay: n/a"));
    }
}
