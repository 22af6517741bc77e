use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("No outcomes to summarize")]
    EmptyOutcomes,

    #[error("No delivered packets: delay statistics are undefined")]
    NoDeliveredPackets,

    #[error("Delay and loss sequences differ in length: {delays} delays, {losses} losses")]
    LengthMismatch { delays: usize, losses: usize },
}

pub type SummaryResult<T> = Result<T, SummaryError>;
