//! Trace files in tshark field-export form
//!
//! Each line is `frame_number,time_epoch,sequence` as produced by
//! `tshark -T fields -e frame.number -e frame.time_epoch -e iperf3.sequence -E separator=,`.

use crate::trace::error::{TraceError, TraceResult};
use crate::trace::types::{Observation, ObservationTrace};
use std::io::Write;
use std::path::Path;

const FIELD_COUNT: usize = 3;

/// Parse a whole trace from its text form. Blank lines are skipped.
pub fn parse_trace(text: &str) -> TraceResult<ObservationTrace> {
    let mut observations = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        observations.push(parse_line(line, idx + 1)?);
    }

    Ok(ObservationTrace::new(observations))
}

fn parse_line(line: &str, line_no: usize) -> TraceResult<Observation> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(TraceError::Malformed {
            line: line_no,
            reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    }

    fields[0].parse::<u64>().map_err(|e| TraceError::Malformed {
        line: line_no,
        reason: format!("bad frame number '{}': {}", fields[0], e),
    })?;

    let timestamp = fields[1].parse::<f64>().map_err(|e| TraceError::Malformed {
        line: line_no,
        reason: format!("bad timestamp '{}': {}", fields[1], e),
    })?;
    if !timestamp.is_finite() {
        return Err(TraceError::Malformed {
            line: line_no,
            reason: format!("non-finite timestamp '{}'", fields[1]),
        });
    }

    let sequence_number = fields[2].parse::<u64>().map_err(|e| TraceError::Malformed {
        line: line_no,
        reason: format!("bad sequence number '{}': {}", fields[2], e),
    })?;

    Ok(Observation::new(sequence_number, timestamp))
}

/// Read and parse a trace file
pub async fn load_trace(path: &Path) -> TraceResult<ObservationTrace> {
    let text = tokio::fs::read_to_string(path).await?;
    let trace = parse_trace(&text)?;
    tracing::debug!("loaded {} observations from {}", trace.len(), path.display());
    Ok(trace)
}

/// Write a trace in the same three-column form, numbering frames from 1
pub fn write_trace<W: Write>(trace: &ObservationTrace, mut writer: W) -> TraceResult<()> {
    for (idx, obs) in trace.iter().enumerate() {
        writeln!(
            writer,
            "{},{:.9},{}",
            idx + 1,
            obs.timestamp,
            obs.sequence_number
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a trace to a file
pub async fn save_trace(trace: &ObservationTrace, path: &Path) -> TraceResult<()> {
    let mut buffer = Vec::with_capacity(trace.len() * 32);
    write_trace(trace, &mut buffer)?;
    tokio::fs::write(path, buffer).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tshark_export() {
        let text = "1,1700000000.100000000,1\n2,1700000000.200000000,2\n\n3,1700000000.300000000,4\n";
        let trace = parse_trace(text).unwrap();

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.get(2).unwrap().sequence_number, 4);
        assert!((trace.get(0).unwrap().timestamp - 1_700_000_000.1).abs() < 1e-6);
    }

    #[test]
    fn test_parse_wrong_field_count() {
        let err = parse_trace("1,0.5\n").unwrap_err();
        match err {
            TraceError::Malformed { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_bad_sequence_reports_line() {
        let err = parse_trace("1,0.1,1\n2,0.2,abc\n").unwrap_err();
        match err {
            TraceError::Malformed { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("sequence"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_nan_timestamp() {
        assert!(parse_trace("1,NaN,1\n").is_err());
    }

    #[test]
    fn test_write_then_parse() {
        let trace = ObservationTrace::from_pairs([(10, 0.25), (11, 0.5)]);
        let mut out = Vec::new();
        write_trace(&trace, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("1,0.250000000,10\n"));
        assert_eq!(parse_trace(&text).unwrap(), trace);
    }

    #[tokio::test]
    async fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clt.csv");
        let trace = ObservationTrace::from_pairs([(1, 1.0), (2, 1.5), (3, 2.0)]);

        save_trace(&trace, &path).await.unwrap();
        let loaded = load_trace(&path).await.unwrap();
        assert_eq!(loaded, trace);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_trace(Path::new("/nonexistent/impairscope/trace.csv")).await;
        assert!(matches!(result, Err(TraceError::Io(_))));
    }
}
