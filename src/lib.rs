//! impairscope: measure what an impairment channel did to a UDP stream
//!
//! Given the packet trace captured before the channel (sender side) and the
//! one captured after it (receiver side), reconstruct per-packet delay and
//! loss and summarise them as loss rate, mean delay, jitter, mean loss-burst
//! length and delay/loss correlation.
//!
//! ```
//! use impairscope::align::align;
//! use impairscope::summary::Summarizer;
//! use impairscope::trace::ObservationTrace;
//!
//! let sender = ObservationTrace::from_pairs([(1, 0.0), (2, 0.1), (3, 0.2)]);
//! let receiver = ObservationTrace::from_pairs([(1, 0.05), (3, 0.25)]);
//!
//! let outcomes = align(&sender, &receiver, -1.0);
//! let summary = Summarizer::summarize(&outcomes).unwrap();
//! assert!((summary.average_loss - 1.0 / 3.0).abs() < 1e-12);
//! ```

pub mod align;
pub mod config;
pub mod experiment;
pub mod metrics;
pub mod simulate;
pub mod summary;
pub mod trace;
