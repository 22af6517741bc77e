//! Parameter sweeps run against the simulated channel

use crate::experiment::batch::{analyze_pair, AnalysisOptions, AnalysisReport};
use crate::experiment::error::{ExperimentError, ExperimentResult};
use crate::experiment::types::{ExperimentParams, SweepConfig};
use crate::simulate::{uniform_sender_trace, ChannelConfig, ImpairmentChannel};

/// Shape of the sender stream replayed for every run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepTraffic {
    pub packets: usize,
    /// Seconds between sent packets
    pub interval: f64,
    /// Base seed; run `n` of the sweep uses `seed + n`
    pub seed: Option<u64>,
}

impl Default for SweepTraffic {
    fn default() -> Self {
        Self {
            packets: 10_000,
            interval: 0.0003,
            seed: None,
        }
    }
}

/// Result of one sweep run
#[derive(Debug)]
pub struct SweepOutcome {
    pub params: ExperimentParams,
    pub result: ExperimentResult<AnalysisReport>,
}

pub struct SweepRunner {
    traffic: SweepTraffic,
    options: AnalysisOptions,
    parallelism: usize,
}

impl SweepRunner {
    pub fn new(traffic: SweepTraffic, options: AnalysisOptions) -> Self {
        Self {
            traffic,
            options,
            parallelism: num_cpus::get(),
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Simulate and analyse every run of the sweep, in sweep order
    pub async fn run(&self, sweep: &SweepConfig) -> ExperimentResult<Vec<SweepOutcome>> {
        use futures::stream::{self, StreamExt};

        sweep.validate()?;
        let runs = sweep.experiments();
        tracing::info!(
            "sweeping {} runs of {} packets",
            runs.len(),
            self.traffic.packets
        );

        let outcomes = stream::iter(runs.into_iter().enumerate())
            .map(|(n, params)| {
                let traffic = self.traffic;
                let options = AnalysisOptions {
                    max_delay: params.profile.max_delay_secs(),
                    ..self.options
                };
                async move {
                    let result = tokio::task::spawn_blocking(move || {
                        Self::run_one(n, &params, &traffic, &options)
                    })
                    .await
                    .map_err(|e| ExperimentError::TaskFailed(e.to_string()))
                    .and_then(|r| r);
                    if let Err(e) = &result {
                        tracing::warn!("sweep run {}: {}", n, e);
                    }
                    SweepOutcome { params, result }
                }
            })
            .buffered(self.parallelism)
            .collect()
            .await;
        Ok(outcomes)
    }

    fn run_one(
        n: usize,
        params: &ExperimentParams,
        traffic: &SweepTraffic,
        options: &AnalysisOptions,
    ) -> ExperimentResult<AnalysisReport> {
        let seed = traffic.seed.map(|s| s.wrapping_add(n as u64));
        let sender = uniform_sender_trace(traffic.packets, 0.0, traffic.interval);
        let config = ChannelConfig::from_profile(&params.profile, seed)?;
        let mut channel = ImpairmentChannel::new(config);
        let receiver = channel.transmit(&sender);

        let name = format!("sweep-{}", n);
        analyze_pair(&name, &sender, &receiver, options)
    }
}
