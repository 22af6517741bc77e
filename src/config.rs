//! Analyzer configuration loaded from TOML
//!
//! ```toml
//! max_delay = -1.0
//! mark_trailing_lost = true
//! parallelism = 4
//!
//! [[experiments]]
//! name = "loss-1pct"
//! sender = "runs/clt.csv"
//! receiver = "runs/srv.csv"
//! profile = { delay_ms = 25.0, jitter_ms = 2.0, loss = 0.01, mu = 0.5, mean_burst_len = 3.0, mean_good_burst_len = 10.0 }
//! ```

use crate::align::DEFAULT_MAX_DELAY;
use crate::experiment::{AnalysisOptions, BatchJob, SweepConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Delay reported for lost packets when an experiment has no profile
    pub max_delay: f64,
    pub mark_trailing_lost: bool,
    pub validate_ordering: bool,
    /// Trace pairs analysed at once
    pub parallelism: usize,
    /// `tracing` filter directive, overridden by `IMPAIRSCOPE_LOG`
    pub log_filter: String,
    pub results_path: Option<PathBuf>,
    pub sweep: Option<SweepConfig>,
    pub experiments: Vec<BatchJob>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_delay: DEFAULT_MAX_DELAY,
            mark_trailing_lost: true,
            validate_ordering: true,
            parallelism: num_cpus::get(),
            log_filter: "info".to_string(),
            results_path: None,
            sweep: None,
            experiments: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Read, parse and validate a config file. Relative trace paths are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        tracing::debug!(
            "loaded config from {} ({} experiments)",
            path.display(),
            config.experiments.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_delay.is_nan() {
            return Err(ConfigError::Invalid("max_delay must be a number".to_string()));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::Invalid(
                "parallelism must be at least 1".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for job in &self.experiments {
            if !names.insert(job.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate experiment name '{}'",
                    job.name
                )));
            }
            if let Some(profile) = &job.profile {
                profile
                    .validate()
                    .map_err(|e| ConfigError::Invalid(format!("{}: {}", job.name, e)))?;
            }
        }

        if let Some(sweep) = &self.sweep {
            sweep
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("sweep: {}", e)))?;
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for job in &mut self.experiments {
            if job.sender.is_relative() {
                job.sender = base.join(&job.sender);
            }
            if job.receiver.is_relative() {
                job.receiver = base.join(&job.receiver);
            }
        }
        if let Some(results) = &self.results_path {
            if results.is_relative() {
                self.results_path = Some(base.join(results));
            }
        }
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            max_delay: self.max_delay,
            mark_trailing_lost: self.mark_trailing_lost,
            validate_ordering: self.validate_ordering,
        }
    }
}
