//! Analysis of one or many sender/receiver trace pairs

use crate::align::{Aligner, Alignment, DEFAULT_MAX_DELAY};
use crate::experiment::error::{ExperimentError, ExperimentResult};
use crate::experiment::types::ImpairmentProfile;
use crate::metrics;
use crate::summary::{Summarizer, SummaryRecord};
use crate::trace::{load_trace, ObservationTrace};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Knobs shared by every analysis in a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnalysisOptions {
    /// Delay reported for lost packets
    pub max_delay: f64,
    pub mark_trailing_lost: bool,
    /// Reject traces whose sequence numbers decrease instead of aligning them anyway
    pub validate_ordering: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_delay: DEFAULT_MAX_DELAY,
            mark_trailing_lost: true,
            validate_ordering: true,
        }
    }
}

impl AnalysisOptions {
    fn aligner(&self) -> Aligner {
        Aligner::new().with_trailing_loss(self.mark_trailing_lost)
    }
}

/// Everything learned from one trace pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub name: String,
    pub sender_packets: usize,
    pub receiver_packets: usize,
    pub outcomes: usize,
    pub lost: usize,
    pub delivered: usize,
    pub excluded_non_causal: usize,
    pub trailing_lost: usize,
    pub misaligned_pairs: usize,
    pub unmatched_receiver: usize,
    pub max_delay: f64,
    pub summary: SummaryRecord,
    pub analyzed_at: i64,
}

impl AnalysisReport {
    fn new(
        name: &str,
        sender: &ObservationTrace,
        receiver: &ObservationTrace,
        max_delay: f64,
        alignment: &Alignment,
        summary: SummaryRecord,
    ) -> Self {
        Self {
            name: name.to_string(),
            sender_packets: sender.len(),
            receiver_packets: receiver.len(),
            outcomes: alignment.len(),
            lost: alignment.lost_count(),
            delivered: alignment.delivered_count(),
            excluded_non_causal: alignment.excluded_non_causal,
            trailing_lost: alignment.trailing_lost,
            misaligned_pairs: alignment.misaligned_pairs,
            unmatched_receiver: alignment.unmatched_receiver,
            max_delay,
            summary,
            analyzed_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Align and summarise one trace pair, recording metrics under `name`
pub fn analyze_pair(
    name: &str,
    sender: &ObservationTrace,
    receiver: &ObservationTrace,
    options: &AnalysisOptions,
) -> ExperimentResult<AnalysisReport> {
    let timer = metrics::AnalysisTimer::start();
    let aligner = options.aligner();

    let alignment = if options.validate_ordering {
        aligner.align_checked(sender, receiver, options.max_delay)?
    } else {
        aligner.align(sender, receiver, options.max_delay)
    };
    metrics::record_alignment(name, sender.len(), &alignment);

    let summary = Summarizer::summarize(&alignment.outcomes)?;
    metrics::record_summary(name, &summary);
    timer.stop();

    tracing::info!("{}: {}", name, summary);
    Ok(AnalysisReport::new(
        name,
        sender,
        receiver,
        options.max_delay,
        &alignment,
        summary,
    ))
}

/// One trace pair on disk to analyse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchJob {
    pub name: String,
    pub sender: PathBuf,
    pub receiver: PathBuf,
    /// Channel configuration the traces were captured under; sets the max-delay sentinel
    #[serde(default)]
    pub profile: Option<ImpairmentProfile>,
}

impl BatchJob {
    pub fn new(
        name: impl Into<String>,
        sender: impl Into<PathBuf>,
        receiver: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            sender: sender.into(),
            receiver: receiver.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: ImpairmentProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    fn options(&self, base: &AnalysisOptions) -> AnalysisOptions {
        match &self.profile {
            Some(profile) => AnalysisOptions {
                max_delay: profile.max_delay_secs(),
                ..*base
            },
            None => *base,
        }
    }
}

/// Result of one batch job
#[derive(Debug)]
pub struct BatchOutcome {
    pub job: BatchJob,
    pub result: ExperimentResult<AnalysisReport>,
}

/// Runs many independent analyses concurrently
pub struct BatchAnalyzer {
    options: AnalysisOptions,
    parallelism: usize,
}

impl BatchAnalyzer {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            parallelism: num_cpus::get(),
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Analyse every job; outcomes come back in job order
    pub async fn run(&self, jobs: Vec<BatchJob>) -> Vec<BatchOutcome> {
        use futures::stream::{self, StreamExt};

        tracing::info!(
            "analysing {} trace pairs with parallelism {}",
            jobs.len(),
            self.parallelism
        );

        stream::iter(jobs)
            .map(|job| {
                let options = job.options(&self.options);
                async move {
                    let result = Self::run_job(&job, options).await;
                    if let Err(e) = &result {
                        tracing::warn!("{}: analysis failed: {}", job.name, e);
                    }
                    BatchOutcome { job, result }
                }
            })
            .buffered(self.parallelism)
            .collect()
            .await
    }

    async fn run_job(
        job: &BatchJob,
        options: AnalysisOptions,
    ) -> ExperimentResult<AnalysisReport> {
        if let Some(profile) = &job.profile {
            profile.validate()?;
        }
        let sender = load_trace(&job.sender).await?;
        let receiver = load_trace(&job.receiver).await?;
        let name = job.name.clone();

        tokio::task::spawn_blocking(move || analyze_pair(&name, &sender, &receiver, &options))
            .await
            .map_err(|e| ExperimentError::TaskFailed(e.to_string()))?
    }
}
