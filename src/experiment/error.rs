use crate::align::AlignError;
use crate::summary::SummaryError;
use crate::trace::TraceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("Invalid impairment profile: {0}")]
    InvalidProfile(String),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("Alignment error: {0}")]
    Align(#[from] AlignError),

    #[error("Summary error: {0}")]
    Summary(#[from] SummaryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}

pub type ExperimentResult<T> = Result<T, ExperimentError>;
