//! Delimited results table, one row per experiment

use crate::experiment::error::ExperimentResult;
use crate::experiment::types::ImpairmentProfile;
use crate::summary::SummaryRecord;
use std::io::Write;

pub const RESULTS_HEADER: &str = "exp_n,delay,mean_burst_len,mean_good_burst_len,loss%,mu%,jitter,comp_delay,comp_jitter,comp_loss,comp_mean_burst_len,correlation";

/// Written in every computed column when an experiment could not be analysed
const FAILED_CELL: &str = "-1";

pub struct ResultsTable<W: Write> {
    writer: W,
    rows: usize,
}

impl<W: Write> ResultsTable<W> {
    /// Start a table, writing the header line immediately
    pub fn new(mut writer: W) -> ExperimentResult<Self> {
        writeln!(writer, "{}", RESULTS_HEADER)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    /// Append one row. `profile` may be absent for trace pairs analysed without
    /// a known channel configuration; its columns are then left empty.
    pub fn write_row(
        &mut self,
        label: &str,
        profile: Option<&ImpairmentProfile>,
        summary: Option<&SummaryRecord>,
    ) -> ExperimentResult<()> {
        let params = match profile {
            Some(p) => format!(
                "{},{},{},{}%,{}%,{}",
                p.delay_ms,
                p.mean_burst_len,
                p.mean_good_burst_len,
                p.loss * 100.0,
                p.mu * 100.0,
                p.jitter_ms
            ),
            None => ",,,,,".to_string(),
        };

        let computed = match summary {
            Some(s) => format!(
                "{},{},{},{},{}",
                optional_cell(s.average_delay),
                optional_cell(s.jitter),
                s.average_loss,
                s.average_burst_length,
                s.correlation
            ),
            None => [FAILED_CELL; 5].join(","),
        };

        writeln!(self.writer, "{},{},{}", label, params, computed)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
