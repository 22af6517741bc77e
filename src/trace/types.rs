use crate::trace::error::OrderingViolation;
use serde::{Deserialize, Serialize};

/// Which end of the impaired path a trace was captured on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CaptureSide {
    Sender,
    Receiver,
}

impl std::fmt::Display for CaptureSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureSide::Sender => write!(f, "sender"),
            CaptureSide::Receiver => write!(f, "receiver"),
        }
    }
}

/// One packet seen at one capture point
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub sequence_number: u64,
    /// Capture time in seconds since the epoch
    pub timestamp: f64,
}

impl Observation {
    pub fn new(sequence_number: u64, timestamp: f64) -> Self {
        Self {
            sequence_number,
            timestamp,
        }
    }
}

impl From<(u64, f64)> for Observation {
    fn from((sequence_number, timestamp): (u64, f64)) -> Self {
        Self::new(sequence_number, timestamp)
    }
}

/// Observations from a single capture point, in capture order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObservationTrace {
    observations: Vec<Observation>,
}

impl ObservationTrace {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Build a trace from `(sequence_number, timestamp)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        Self {
            observations: pairs.into_iter().map(Observation::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Capture span in seconds (last timestamp minus first)
    pub fn duration(&self) -> f64 {
        match (self.observations.first(), self.observations.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Check that sequence numbers never decrease
    pub fn validate_ordering(&self) -> Result<(), OrderingViolation> {
        for (index, pair) in self.observations.windows(2).enumerate() {
            if pair[1].sequence_number < pair[0].sequence_number {
                return Err(OrderingViolation {
                    index: index + 1,
                    previous: pair[0].sequence_number,
                    current: pair[1].sequence_number,
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Observation>> for ObservationTrace {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}

impl FromIterator<Observation> for ObservationTrace {
    fn from_iter<T: IntoIterator<Item = Observation>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ObservationTrace {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let trace = ObservationTrace::from_pairs([(1, 0.0), (2, 0.1)]);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.get(1), Some(&Observation::new(2, 0.1)));
        assert!((trace.duration() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_empty_trace() {
        let trace = ObservationTrace::default();
        assert!(trace.is_empty());
        assert_eq!(trace.duration(), 0.0);
        assert!(trace.validate_ordering().is_ok());
    }

    #[test]
    fn test_ordering_allows_equal_sequence_numbers() {
        let trace = ObservationTrace::from_pairs([(1, 0.0), (1, 0.1), (2, 0.2)]);
        assert!(trace.validate_ordering().is_ok());
    }

    #[test]
    fn test_ordering_violation() {
        let trace = ObservationTrace::from_pairs([(1, 0.0), (3, 0.1), (2, 0.2)]);
        assert_eq!(
            trace.validate_ordering(),
            Err(OrderingViolation {
                index: 2,
                previous: 3,
                current: 2,
            })
        );
    }
}
