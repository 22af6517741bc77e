//! Per-statistic functions over parallel `delays` / `losses` slices
//!
//! `losses[i]` flags whether the packet behind `delays[i]` was lost. Lost
//! entries carry the max-delay sentinel in `delays`, so every delay statistic
//! except `correlation` filters them out first.

use crate::summary::error::{SummaryError, SummaryResult};

/// Fewest outcomes for which a correlation is computed at all
const MIN_CORRELATION_SAMPLES: usize = 3;

fn check_lengths(delays: &[f64], losses: &[bool]) -> SummaryResult<()> {
    if delays.len() != losses.len() {
        return Err(SummaryError::LengthMismatch {
            delays: delays.len(),
            losses: losses.len(),
        });
    }
    Ok(())
}

fn delivered_delays<'a>(
    delays: &'a [f64],
    losses: &'a [bool],
) -> impl Iterator<Item = f64> + 'a {
    delays
        .iter()
        .zip(losses)
        .filter(|&(_, &lost)| !lost)
        .map(|(&delay, _)| delay)
}

fn indicator(lost: bool) -> f64 {
    if lost {
        1.0
    } else {
        0.0
    }
}

/// Fraction of packets lost
pub fn average_loss(losses: &[bool]) -> SummaryResult<f64> {
    if losses.is_empty() {
        return Err(SummaryError::EmptyOutcomes);
    }
    let lost = losses.iter().filter(|&&lost| lost).count();
    Ok(lost as f64 / losses.len() as f64)
}

/// Mean delay of delivered packets
pub fn average_delay(delays: &[f64], losses: &[bool]) -> SummaryResult<f64> {
    check_lengths(delays, losses)?;

    let (sum, count) = delivered_delays(delays, losses)
        .fold((0.0, 0usize), |(sum, count), delay| (sum + delay, count + 1));
    if count == 0 {
        return Err(SummaryError::NoDeliveredPackets);
    }
    Ok(sum / count as f64)
}

/// Largest absolute deviation of a delivered delay from `mean`.
///
/// This is peak deviation, not RMS jitter. `mean` defaults to
/// [`average_delay`] over the same packets.
pub fn jitter(delays: &[f64], losses: &[bool], mean: Option<f64>) -> SummaryResult<f64> {
    let mean = match mean {
        Some(mean) => {
            check_lengths(delays, losses)?;
            mean
        }
        None => average_delay(delays, losses)?,
    };

    delivered_delays(delays, losses)
        .map(|delay| (delay - mean).abs())
        .fold(None, |peak: Option<f64>, dev| Some(peak.map_or(dev, |p| p.max(dev))))
        .ok_or(SummaryError::NoDeliveredPackets)
}

/// Mean length of maximal runs of consecutive losses; `0.0` when nothing was lost
pub fn average_loss_burst_length(losses: &[bool]) -> f64 {
    let mut bursts = 0usize;
    let mut burst_total = 0usize;
    let mut in_burst = false;

    for &lost in losses {
        if lost {
            burst_total += 1;
            if !in_burst {
                bursts += 1;
                in_burst = true;
            }
        } else {
            in_burst = false;
        }
    }

    if bursts == 0 {
        return 0.0;
    }
    burst_total as f64 / bursts as f64
}

/// Pearson correlation between the raw delays (sentinels included) and the loss indicator.
///
/// Returns `0.0` when fewer than three outcomes exist, when the loss indicator
/// is constant, or when the coefficient comes out NaN.
pub fn correlation(delays: &[f64], losses: &[bool]) -> SummaryResult<f64> {
    check_lengths(delays, losses)?;

    let n = delays.len();
    if n < MIN_CORRELATION_SAMPLES {
        return Ok(0.0);
    }
    let first = losses[0];
    if losses.iter().all(|&lost| lost == first) {
        return Ok(0.0);
    }

    let mean_x = delays.iter().sum::<f64>() / n as f64;
    let mean_y = losses.iter().map(|&l| indicator(l)).sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&delay, &lost) in delays.iter().zip(losses) {
        let dx = delay - mean_x;
        let dy = indicator(lost) - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let r = sxy / (sxx * syy).sqrt();
    if r.is_nan() {
        return Ok(0.0);
    }
    Ok(r.clamp(-1.0, 1.0))
}
