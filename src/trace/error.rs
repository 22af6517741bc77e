use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed trace line {line}: {reason}")]
    Malformed { line: usize, reason: String },

}

pub type TraceResult<T> = Result<T, TraceError>;

/// First place a trace's sequence numbers go backwards
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Trace is not sequence-ordered at index {index}: {current} follows {previous}")]
pub struct OrderingViolation {
    pub index: usize,
    pub previous: u64,
    pub current: u64,
}
