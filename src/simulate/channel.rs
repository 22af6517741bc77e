//! Simulated impairment channel for producing receiver traces in-process
//!
//! Applies delay, jitter and (optionally bursty) loss to a sender trace
//! without a real qdisc, so the analysis pipeline can be exercised end to end.

use crate::experiment::{DlcTransitions, ExperimentResult, GilbertTransitions, ImpairmentProfile};
use crate::trace::{Observation, ObservationTrace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How the channel decides which packets to drop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum LossModel {
    None,
    /// Independent loss with fixed probability
    Bernoulli { rate: f64 },
    /// Two-state good/loss chain; packets are lost while in the loss state
    GilbertElliott(GilbertTransitions),
    /// Good/congested/loss chain; loss is reached only through congestion
    Dlc(DlcTransitions),
}

/// Where the loss chain currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    Good,
    Congested,
    Loss,
}

/// Configuration for the impairment channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelConfig {
    /// Base one-way delay in milliseconds
    pub delay_ms: f64,
    /// Delay varies uniformly within `delay_ms ± jitter_ms`, never below zero
    pub jitter_ms: f64,
    pub loss_model: LossModel,
    /// Fixed seed for reproducible runs; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            delay_ms: 0.0,
            jitter_ms: 0.0,
            loss_model: LossModel::None,
            seed: None,
        }
    }
}

impl ChannelConfig {
    /// Channel matching an impairment profile.
    ///
    /// Lossy profiles with a congested share (`mu > 0`) get the three-state
    /// chain; `mu == 0` gets the two-state good/loss chain.
    pub fn from_profile(
        profile: &ImpairmentProfile,
        seed: Option<u64>,
    ) -> ExperimentResult<Self> {
        profile.validate()?;
        let loss_model = if profile.loss <= 0.0 {
            LossModel::None
        } else if profile.mu > 0.0 {
            LossModel::Dlc(profile.dlc_transitions()?)
        } else {
            LossModel::GilbertElliott(profile.gilbert_transitions())
        };
        Ok(Self {
            delay_ms: profile.delay_ms,
            jitter_ms: profile.jitter_ms,
            loss_model,
            seed,
        })
    }
}

/// Counters kept by the channel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    pub packets_sent: u64,
    pub packets_lost: u64,
}

impl ChannelStats {
    pub fn actual_loss_rate(&self) -> f64 {
        if self.packets_sent > 0 {
            self.packets_lost as f64 / self.packets_sent as f64
        } else {
            0.0
        }
    }
}

pub struct ImpairmentChannel {
    config: ChannelConfig,
    rng: StdRng,
    state: ChainState,
    last_arrival: f64,
    stats: ChannelStats,
}

impl ImpairmentChannel {
    pub fn new(config: ChannelConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            state: ChainState::Good,
            last_arrival: f64::NEG_INFINITY,
            stats: ChannelStats::default(),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Pass one packet through the channel; `None` if it was dropped
    pub fn send(&mut self, observation: &Observation) -> Option<Observation> {
        self.stats.packets_sent += 1;

        if self.drop_next() {
            self.stats.packets_lost += 1;
            return None;
        }

        let jitter = if self.config.jitter_ms > 0.0 {
            self.rng.gen_range(-self.config.jitter_ms..=self.config.jitter_ms)
        } else {
            0.0
        };
        let delay = (self.config.delay_ms + jitter).max(0.0) / 1000.0;

        // FIFO: a packet never overtakes the one before it
        let arrival = (observation.timestamp + delay).max(self.last_arrival);
        self.last_arrival = arrival;

        Some(Observation::new(observation.sequence_number, arrival))
    }

    fn drop_next(&mut self) -> bool {
        match self.config.loss_model {
            LossModel::None => false,
            LossModel::Bernoulli { rate } => self.rng.gen::<f64>() < rate,
            LossModel::GilbertElliott(t) => {
                let p = self.rng.gen::<f64>();
                self.state = match self.state {
                    ChainState::Loss if p < t.p31 => ChainState::Good,
                    ChainState::Loss => ChainState::Loss,
                    _ if p < t.p13 => ChainState::Loss,
                    _ => ChainState::Good,
                };
                self.state == ChainState::Loss
            }
            LossModel::Dlc(t) => {
                let p = self.rng.gen::<f64>();
                self.state = match self.state {
                    ChainState::Good if p < t.p12 => ChainState::Congested,
                    ChainState::Good => ChainState::Good,
                    ChainState::Congested if p < t.p21 => ChainState::Good,
                    ChainState::Congested if p < t.p21 + t.p23 => ChainState::Loss,
                    ChainState::Congested => ChainState::Congested,
                    ChainState::Loss if p < t.p32 => ChainState::Congested,
                    ChainState::Loss => ChainState::Loss,
                };
                self.state == ChainState::Loss
            }
        }
    }

    /// Pass a whole sender trace through, returning what the receiver would capture
    pub fn transmit(&mut self, sender: &ObservationTrace) -> ObservationTrace {
        let received: ObservationTrace = sender.iter().filter_map(|obs| self.send(obs)).collect();
        tracing::debug!(
            "channel delivered {}/{} packets ({:.2}% loss)",
            received.len(),
            sender.len(),
            self.stats.actual_loss_rate() * 100.0
        );
        received
    }

    pub fn reset_stats(&mut self) {
        self.stats = ChannelStats::default();
    }
}

/// Constant-rate sender trace: `count` packets numbered from 1, `interval` seconds apart
pub fn uniform_sender_trace(count: usize, start: f64, interval: f64) -> ObservationTrace {
    (0..count)
        .map(|i| Observation::new(i as u64 + 1, start + i as f64 * interval))
        .collect()
}
