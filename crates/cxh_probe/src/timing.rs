//! Adaptive wall-clock timing.
//!
//! Noise (scheduling, caches, other processes) only ever makes a run slower,
//! so the minimum over repeated runs is the best estimate of the true cost.
//! [`measure_min`] keeps sampling until the smallest samples agree, the
//! command is slow enough that few repeats suffice, or a hard cap is reached.

/// Stopping rules of the adaptive timing protocol.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingPolicy {
    /// Hard cap on the number of samples.
    pub max_samples: usize,
    /// Samples required before the stability rule applies.
    pub stable_samples: usize,
    /// 1-based rank of the sample compared against the minimum.
    pub stable_rank: usize,
    /// Stop once `sample[stable_rank] / sample[1]` drops below this ratio.
    pub stable_ratio: f64,
    /// Minimum (in seconds) above which a run counts as long.
    pub long_run_secs: f64,
    /// Samples required before the long-run rule applies.
    pub long_run_samples: usize,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            max_samples: 11,
            stable_samples: 8,
            stable_rank: 4,
            stable_ratio: 1.01,
            long_run_secs: 0.5,
            long_run_samples: 3,
        }
    }
}

impl TimingPolicy {
    /// Returns `true` once `sorted` (ascending) holds enough samples.
    pub fn is_done(&self, sorted: &[f64]) -> bool {
        let n = sorted.len();
        if n == 0 {
            return false;
        }
        if n >= self.max_samples {
            return true;
        }
        if n >= self.stable_samples {
            if let Some(ranked) = sorted.get(self.stable_rank.saturating_sub(1)) {
                if ranked / sorted[0] < self.stable_ratio {
                    return true;
                }
            }
        }
        n >= self.long_run_samples && sorted[0] > self.long_run_secs
    }
}

/// Result of one adaptive measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Smallest observed duration in seconds.
    pub min: f64,
    /// Number of samples taken.
    pub samples: usize,
}

/// Repeatedly calls `sample` until `policy` is satisfied and returns the minimum.
///
/// `sample` performs one run and returns its duration in seconds. The first
/// error aborts the measurement.
pub fn measure_min<E, F>(policy: &TimingPolicy, mut sample: F) -> Result<Measurement, E>
where
    F: FnMut() -> Result<f64, E>,
{
    let mut samples: Vec<f64> = Vec::with_capacity(policy.max_samples);
    while !policy.is_done(&samples) {
        samples.push(sample()?);
        samples.sort_by(f64::total_cmp);
    }
    Ok(Measurement {
        min: samples[0],
        samples: samples.len(),
    })
}
