//! Cheap noise pre-filter for candidate transitions.
//!
//! Looks only at the flank statistics either side of a spike. It is not a
//! hypothesis test: the spread of the higher-mean flank alone decides
//! whether two levels are distinct.

use psg_config::SpikeFilterConfig;
use serde::Serialize;

use crate::statistic::RunningStatistic;

/// Outcome of classifying one spike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeVerdict {
    Accepted,
    /// A flank is too noisy to be a stable state.
    NoisyFlank,
    /// The flank means are too close to be different states.
    IndistinctLevels,
}

impl SpikeVerdict {
    pub fn is_rejected(self) -> bool {
        self != SpikeVerdict::Accepted
    }
}

impl std::fmt::Display for SpikeVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpikeVerdict::Accepted => write!(f, "accepted"),
            SpikeVerdict::NoisyFlank => write!(f, "noisy_flank"),
            SpikeVerdict::IndistinctLevels => write!(f, "indistinct_levels"),
        }
    }
}

/// Classify the spike between `before` and `after`.
pub fn classify_spike(
    before: &RunningStatistic,
    after: &RunningStatistic,
    config: &SpikeFilterConfig,
) -> SpikeVerdict {
    let too_noisy =
        |stat: &RunningStatistic| stat.stdev() > config.max_noise_ratio * stat.mean().abs();
    if too_noisy(before) || too_noisy(after) {
        return SpikeVerdict::NoisyFlank;
    }

    let higher = if after.mean() > before.mean() {
        after
    } else {
        before
    };
    let separation = (before.mean() - after.mean()).abs();
    if separation < config.separation_stdevs * higher.stdev() {
        return SpikeVerdict::IndistinctLevels;
    }

    SpikeVerdict::Accepted
}

/// True when the spike looks like noise rather than a state change.
pub fn reject_spike(
    before: &RunningStatistic,
    after: &RunningStatistic,
    config: &SpikeFilterConfig,
) -> bool {
    classify_spike(before, after, config).is_rejected()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(samples: &[f64]) -> RunningStatistic {
        RunningStatistic::from_samples(samples).unwrap()
    }

    #[test]
    fn noisy_flank_on_either_side() {
        let cfg = SpikeFilterConfig::default();
        // mean 100, stdev 40
        let noisy = stat(&[60.0, 100.0, 140.0]);
        let quiet = stat(&[495.0, 500.0, 505.0]);
        assert_eq!(classify_spike(&noisy, &quiet, &cfg), SpikeVerdict::NoisyFlank);
        assert_eq!(classify_spike(&quiet, &noisy, &cfg), SpikeVerdict::NoisyFlank);
        assert!(reject_spike(&noisy, &quiet, &cfg));
    }

    #[test]
    fn close_means_rejected() {
        let cfg = SpikeFilterConfig::default();
        // mean 100 vs 115, both stdev 10
        let before = stat(&[90.0, 100.0, 110.0]);
        let after = stat(&[105.0, 115.0, 125.0]);
        assert_eq!(
            classify_spike(&before, &after, &cfg),
            SpikeVerdict::IndistinctLevels
        );
    }

    #[test]
    fn distinct_levels_accepted() {
        let cfg = SpikeFilterConfig::default();
        let before = stat(&[95.0, 100.0, 105.0]);
        let after = stat(&[495.0, 500.0, 505.0]);
        assert_eq!(classify_spike(&before, &after, &cfg), SpikeVerdict::Accepted);
        assert!(!reject_spike(&after, &before, &cfg));
    }

    #[test]
    fn zero_level_flank_is_noisy_only_with_spread() {
        let cfg = SpikeFilterConfig::default();
        let off = stat(&[0.0, 0.0, 0.0]);
        let on = stat(&[1995.0, 2000.0, 2005.0]);
        assert_eq!(classify_spike(&off, &on, &cfg), SpikeVerdict::Accepted);
    }

    #[test]
    fn verdict_display() {
        assert_eq!(SpikeVerdict::NoisyFlank.to_string(), "noisy_flank");
        assert!(!SpikeVerdict::Accepted.is_rejected());
    }
}
