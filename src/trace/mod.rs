//! Packet observation traces
//!
//! A trace is the ordered list of `(sequence_number, timestamp)` pairs seen at
//! one capture point. Traces are produced by the reader (or the simulator) and
//! consumed read-only by the aligner.

pub mod error;
pub mod reader;
pub mod types;

pub use error::{OrderingViolation, TraceError, TraceResult};
pub use reader::{load_trace, parse_trace, save_trace, write_trace};
pub use types::{CaptureSide, Observation, ObservationTrace};
