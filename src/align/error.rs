use crate::trace::CaptureSide;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    #[error("{side} trace is not sequence-ordered at index {index}: {current} follows {previous}")]
    UnorderedTrace {
        side: CaptureSide,
        index: usize,
        previous: u64,
        current: u64,
    },

    #[error("Invalid max delay sentinel: {0}")]
    InvalidMaxDelay(f64),
}

pub type AlignResult<T> = Result<T, AlignError>;
