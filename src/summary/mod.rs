//! Summary statistics over aligned outcomes

pub mod error;
pub mod stats;
pub mod summarizer;
pub mod types;

pub use error::{SummaryError, SummaryResult};
pub use stats::{average_delay, average_loss, average_loss_burst_length, correlation, jitter};
pub use summarizer::Summarizer;
pub use types::SummaryRecord;
