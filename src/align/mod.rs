//! Sender/receiver trace alignment
//!
//! Reconstructs, for every packet in the sender trace, whether it reached the
//! receiver and with what one-way delay.

pub mod aligner;
pub mod error;
pub mod types;

pub use aligner::{align, Aligner};
pub use error::{AlignError, AlignResult};
pub use types::{Alignment, OutcomeRecord, DEFAULT_MAX_DELAY};
