use serde::{Deserialize, Serialize};

/// Summary statistics for one aligned run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SummaryRecord {
    /// Fraction of sender packets lost, in `[0, 1]`
    pub average_loss: f64,
    /// Mean one-way delay of delivered packets (seconds); `None` if nothing was delivered
    pub average_delay: Option<f64>,
    /// Peak deviation of delivered delays from their mean (seconds)
    pub jitter: Option<f64>,
    pub average_burst_length: f64,
    /// Pearson correlation between delay and loss indicator
    pub correlation: f64,
}

impl std::fmt::Display for SummaryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ms = |v: Option<f64>| match v {
            Some(secs) => format!("{:.3}ms", secs * 1000.0),
            None => "n/a".to_string(),
        };
        write!(
            f,
            "loss: {:.3}%, delay: {}, jitter: {}, mean burst: {:.2}, corr: {:.4}",
            self.average_loss * 100.0,
            ms(self.average_delay),
            ms(self.jitter),
            self.average_burst_length,
            self.correlation
        )
    }
}
