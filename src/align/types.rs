use serde::{Deserialize, Serialize};

/// Delay reported for lost packets when the caller has no better sentinel
pub const DEFAULT_MAX_DELAY: f64 = -1.0;

/// Fate of one sender-side packet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OutcomeRecord {
    /// One-way delay in seconds, or the max-delay sentinel when lost
    pub delay: f64,
    pub lost: bool,
}

impl OutcomeRecord {
    pub fn delivered(delay: f64) -> Self {
        Self { delay, lost: false }
    }

    pub fn lost(max_delay: f64) -> Self {
        Self {
            delay: max_delay,
            lost: true,
        }
    }
}

/// Output of an alignment run plus the counters that explain it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Alignment {
    pub outcomes: Vec<OutcomeRecord>,
    /// Matched pairs dropped because the receiver saw the packet no later than the sender
    pub excluded_non_causal: usize,
    /// Sender packets marked lost after the receiver trace ran out
    pub trailing_lost: usize,
    /// Pairs matched while the receiver sequence number was below the sender's
    pub misaligned_pairs: usize,
    /// Receiver packets never consumed because the sender trace ran out
    pub unmatched_receiver: usize,
}

impl Alignment {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn lost_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.lost).count()
    }

    pub fn delivered_count(&self) -> usize {
        self.outcomes.len() - self.lost_count()
    }

    /// Delay projection, sentinel values included
    pub fn delays(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.delay).collect()
    }

    /// Loss-indicator projection
    pub fn losses(&self) -> Vec<bool> {
        self.outcomes.iter().map(|o| o.lost).collect()
    }

    pub fn into_outcomes(self) -> Vec<OutcomeRecord> {
        self.outcomes
    }
}
