use crate::experiment::error::{ExperimentError, ExperimentResult};
use serde::{Deserialize, Serialize};

/// Settings of the impairment channel for one experiment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ImpairmentProfile {
    /// Base one-way delay in milliseconds
    pub delay_ms: f64,
    /// Delay variation in milliseconds
    pub jitter_ms: f64,
    /// Target long-run loss probability (0.0 - 1.0)
    pub loss: f64,
    /// Share of non-loss time spent in the congested state, in `[0, 1)`.
    /// Zero leaves out the congested state and gives a plain two-state chain.
    pub mu: f64,
    /// Mean number of consecutive losses
    pub mean_burst_len: f64,
    /// Mean number of consecutive deliveries between congestion episodes
    pub mean_good_burst_len: f64,
}

impl Default for ImpairmentProfile {
    fn default() -> Self {
        Self {
            delay_ms: 25.0,
            jitter_ms: 2.0,
            loss: 0.01,
            mu: 0.5,
            mean_burst_len: 3.0,
            mean_good_burst_len: 10.0,
        }
    }
}

/// Two-state loss model parameters in netem `loss state p13 p31` terms
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GilbertTransitions {
    /// Probability of entering the loss state from the good state
    pub p13: f64,
    /// Probability of leaving the loss state
    pub p31: f64,
}

impl GilbertTransitions {
    /// Long-run fraction of packets lost
    pub fn stationary_loss(&self) -> f64 {
        if self.p13 + self.p31 == 0.0 {
            return 0.0;
        }
        self.p13 / (self.p13 + self.p31)
    }
}

/// Three-state congestion chain: good (1), congested (2), loss (3).
///
/// Loss is only entered from the congested state and always returns to it,
/// so loss bursts stay `1 / p32` long while `mu` decides how tightly they cluster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DlcTransitions {
    pub p12: f64,
    pub p21: f64,
    pub p23: f64,
    pub p32: f64,
}

impl DlcTransitions {
    /// Long-run occupancy of the good, congested and loss states
    pub fn stationary(&self) -> [f64; 3] {
        let weights = [
            self.p21 * self.p32,
            self.p12 * self.p32,
            self.p12 * self.p23,
        ];
        let total: f64 = weights.iter().sum();
        if total == 0.0 {
            return [1.0, 0.0, 0.0];
        }
        weights.map(|w| w / total)
    }

    pub fn stationary_loss(&self) -> f64 {
        self.stationary()[2]
    }
}

impl ImpairmentProfile {
    pub fn validate(&self) -> ExperimentResult<()> {
        if !self.delay_ms.is_finite() || self.delay_ms < 0.0 {
            return Err(ExperimentError::InvalidProfile(format!(
                "delay must be non-negative, got {}ms",
                self.delay_ms
            )));
        }
        if !self.jitter_ms.is_finite() || self.jitter_ms < 0.0 {
            return Err(ExperimentError::InvalidProfile(format!(
                "jitter must be non-negative, got {}ms",
                self.jitter_ms
            )));
        }
        if !(0.0..1.0).contains(&self.loss) {
            return Err(ExperimentError::InvalidProfile(format!(
                "loss must be in [0, 1), got {}",
                self.loss
            )));
        }
        if !(0.0..1.0).contains(&self.mu) {
            return Err(ExperimentError::InvalidProfile(format!(
                "mu must be in [0, 1), got {}",
                self.mu
            )));
        }
        if self.mean_burst_len.is_nan() || self.mean_burst_len < 1.0 {
            return Err(ExperimentError::InvalidProfile(format!(
                "mean burst length must be at least 1, got {}",
                self.mean_burst_len
            )));
        }
        if self.mean_good_burst_len.is_nan() || self.mean_good_burst_len < 1.0 {
            return Err(ExperimentError::InvalidProfile(format!(
                "mean good burst length must be at least 1, got {}",
                self.mean_good_burst_len
            )));
        }
        if self.loss > 0.0 && self.mu > 0.0 {
            self.dlc_transitions()?;
        }
        Ok(())
    }

    /// Delay reported for lost packets: the largest delay the channel can add, in seconds
    pub fn max_delay_secs(&self) -> f64 {
        (self.delay_ms + self.jitter_ms) / 1000.0
    }

    /// Three-state chain reproducing `loss` with bursts of `mean_burst_len`,
    /// spending a `mu` share of the delivered time congested, with congested
    /// stretches of `mean_good_burst_len` packets.
    ///
    /// Fails when `mu` is outside `(0, 1)` or is too small to carry the
    /// requested loss, i.e. `mu * (1 - loss) * mean_burst_len < loss * mean_good_burst_len`.
    pub fn dlc_transitions(&self) -> ExperimentResult<DlcTransitions> {
        if !(self.mu > 0.0 && self.mu < 1.0) {
            return Err(ExperimentError::InvalidProfile(format!(
                "congested share mu must be in (0, 1) for the three-state chain, got {}",
                self.mu
            )));
        }

        let t = self.loss / ((1.0 - self.loss) * self.mean_burst_len * (1.0 - self.mu));
        let p23 = (1.0 - self.mu) / self.mu * t;
        let transitions = DlcTransitions {
            p12: self.mu / ((1.0 - self.mu) * self.mean_good_burst_len) - t,
            p21: 1.0 / self.mean_good_burst_len - p23,
            p23,
            p32: 1.0 / self.mean_burst_len,
        };

        for (name, p) in [
            ("p12", transitions.p12),
            ("p21", transitions.p21),
            ("p23", transitions.p23),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ExperimentError::InvalidProfile(format!(
                    "mu = {} cannot carry loss {} with bursts of {} and congested runs of {} ({} = {})",
                    self.mu, self.loss, self.mean_burst_len, self.mean_good_burst_len, name, p
                )));
            }
        }
        Ok(transitions)
    }

    /// Two-state loss parameters reproducing `loss` with bursts of `mean_burst_len`
    pub fn gilbert_transitions(&self) -> GilbertTransitions {
        GilbertTransitions {
            p13: self.loss / (self.mean_burst_len * (1.0 - self.loss)),
            p31: 1.0 / self.mean_burst_len,
        }
    }
}

/// One run of a sweep
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExperimentParams {
    /// Repeat index within the same parameter combination
    pub exp_i: usize,
    pub profile: ImpairmentProfile,
}

/// Grid of profiles to run, each repeated `repeats` times
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    pub delay_ms: f64,
    pub mean_burst_len: f64,
    pub mean_good_burst_len: f64,
    pub losses: Vec<f64>,
    pub mus: Vec<f64>,
    pub jitters: Vec<f64>,
    pub repeats: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            delay_ms: 25.0,
            mean_burst_len: 3.0,
            mean_good_burst_len: 10.0,
            losses: vec![0.001, 0.01],
            mus: vec![0.5],
            jitters: vec![2.0],
            repeats: 2,
        }
    }
}

impl SweepConfig {
    /// Enumerate runs: loss, then mu, then jitter, then repeat index
    pub fn experiments(&self) -> Vec<ExperimentParams> {
        let mut runs = Vec::with_capacity(self.len());
        for &loss in &self.losses {
            for &mu in &self.mus {
                for &jitter_ms in &self.jitters {
                    for exp_i in 0..self.repeats {
                        runs.push(ExperimentParams {
                            exp_i,
                            profile: ImpairmentProfile {
                                delay_ms: self.delay_ms,
                                jitter_ms,
                                loss,
                                mu,
                                mean_burst_len: self.mean_burst_len,
                                mean_good_burst_len: self.mean_good_burst_len,
                            },
                        });
                    }
                }
            }
        }
        runs
    }

    pub fn len(&self) -> usize {
        self.losses.len() * self.mus.len() * self.jitters.len() * self.repeats
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every profile the sweep would produce
    pub fn validate(&self) -> ExperimentResult<()> {
        self.experiments()
            .iter()
            .try_for_each(|params| params.profile.validate())
    }
}
