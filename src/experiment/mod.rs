//! Experiment bookkeeping around the core
//!
//! Impairment profiles and parameter sweeps, concurrent analysis of many
//! trace pairs, simulated sweeps, and the delimited results table.

pub mod batch;
pub mod error;
pub mod results;
pub mod sweep;
pub mod types;

pub use batch::{
    analyze_pair, AnalysisOptions, AnalysisReport, BatchAnalyzer, BatchJob, BatchOutcome,
};
pub use error::{ExperimentError, ExperimentResult};
pub use results::{ResultsTable, RESULTS_HEADER};
pub use sweep::{SweepOutcome, SweepRunner, SweepTraffic};
pub use types::{
    DlcTransitions, ExperimentParams, GilbertTransitions, ImpairmentProfile, SweepConfig,
};
