//! Bounded-memory running statistics over power readings.
//!
//! A [`RunningStatistic`] summarizes a stretch of samples (mean, sample
//! standard deviation, min, max, count) and can absorb further batches
//! without retaining the raw readings.
//!
//! # Incremental update
//!
//! [`RunningStatistic::update`] combines means exactly (count-weighted) but
//! updates the spread approximately: the squared deviations of the *new*
//! samples from the *new* mean are added to the accumulator stored at the
//! previous update, and the old samples are never revisited. The result
//! is biased relative to an exact recomputation. Matching thresholds are
//! calibrated against this bias, so the rule must stay as written.

use psg_math::welch::{welch_test, SampleSummary};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default significance level for [`RunningStatistic::similar`].
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Mean / spread / range summary of a set of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningStatistic {
    mean: f64,
    stdev: f64,
    min: f64,
    max: f64,
    /// Σ(x − mean)² as of the last construction or update.
    stdev_accumulator: f64,
    num_data_points: usize,
}

/// Reject `end <= begin` and `end > len`.
pub(crate) fn check_range(len: usize, begin: usize, end: usize) -> Result<()> {
    if end <= begin {
        return Err(Error::EmptyRange { begin, end });
    }
    if end > len {
        return Err(Error::RangeOutOfBounds { end, len });
    }
    Ok(())
}

fn sample_stdev(accumulator: f64, n: usize) -> f64 {
    if n > 1 {
        (accumulator / (n - 1) as f64).sqrt()
    } else {
        0.0
    }
}

impl RunningStatistic {
    /// Exact statistics over `samples[begin..end]`.
    pub fn from_range(samples: &[f64], begin: usize, end: usize) -> Result<Self> {
        check_range(samples.len(), begin, end)?;
        let window = &samples[begin..end];
        let n = window.len();

        let (sum, min, max) = window.iter().fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), &x| (sum + x, min.min(x), max.max(x)),
        );
        let mean = sum / n as f64;
        let stdev_accumulator: f64 = window.iter().map(|x| (x - mean).powi(2)).sum();

        Ok(Self {
            mean,
            stdev: sample_stdev(stdev_accumulator, n),
            min,
            max,
            stdev_accumulator,
            num_data_points: n,
        })
    }

    /// Exact statistics over a whole slice.
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        Self::from_range(samples, 0, samples.len())
    }

    /// A single observation: mean = min = max = `value`, stdev 0.
    pub fn from_value(value: f64) -> Self {
        Self {
            mean: value,
            stdev: 0.0,
            min: value,
            max: value,
            stdev_accumulator: 0.0,
            num_data_points: 1,
        }
    }

    /// Statistics of a normalized histogram over bins `[begin, end)`.
    ///
    /// Each bin index is treated as a data value weighted by its
    /// de-normalized count, `round(bins[i] * source_sample_count)`. `min`
    /// and `max` are the bin range bounds. When every weight rounds to
    /// zero the result is a placeholder (see [`Self::is_placeholder`])
    /// with `mean = (begin + end) / 2` and no data points.
    pub fn from_histogram(
        bins: &[f64],
        source_sample_count: usize,
        begin: usize,
        end: usize,
    ) -> Result<Self> {
        check_range(bins.len(), begin, end)?;
        let min = begin as f64;
        let max = end as f64;

        let weights: Vec<(f64, f64)> = (begin..end)
            .map(|i| {
                let weight = (bins[i] * source_sample_count as f64 + 0.5).floor().max(0.0);
                (i as f64, weight)
            })
            .collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();

        if total == 0.0 {
            return Ok(Self {
                mean: (min + max) / 2.0,
                stdev: 0.0,
                min,
                max,
                stdev_accumulator: 0.0,
                num_data_points: 0,
            });
        }

        let mean = weights.iter().map(|(i, w)| i * w).sum::<f64>() / total;
        let stdev_accumulator: f64 = weights.iter().map(|(i, w)| w * (i - mean).powi(2)).sum();
        let num_data_points = total as usize;

        Ok(Self {
            mean,
            stdev: sample_stdev(stdev_accumulator, num_data_points),
            min,
            max,
            stdev_accumulator,
            num_data_points,
        })
    }

    /// Fold `samples[begin..end]` into this statistic.
    ///
    /// The mean is combined exactly; the spread uses the approximate
    /// stale-accumulator rule described in the module docs.
    pub fn update(&mut self, samples: &[f64], begin: usize, end: usize) -> Result<()> {
        check_range(samples.len(), begin, end)?;
        self.absorb(&samples[begin..end]);
        Ok(())
    }

    /// Fold a whole slice into this statistic.
    pub fn update_from_samples(&mut self, samples: &[f64]) -> Result<()> {
        self.update(samples, 0, samples.len())
    }

    /// Fold one observation into this statistic (a batch of one).
    pub fn update_value(&mut self, value: f64) {
        self.absorb(std::slice::from_ref(&value));
    }

    fn absorb(&mut self, batch: &[f64]) {
        let n_old = self.num_data_points;
        let n_batch = batch.len();
        let n_total = n_old + n_batch;

        let (sum, min, max) = batch.iter().fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), &x| (sum + x, min.min(x), max.max(x)),
        );
        // Count-weighted combination of the old mean and the batch mean.
        self.mean = (self.mean * n_old as f64 + sum) / n_total as f64;

        if n_old == 0 {
            self.min = min;
            self.max = max;
        } else {
            self.min = self.min.min(min);
            self.max = self.max.max(max);
        }

        let mean = self.mean;
        self.stdev_accumulator += batch.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
        self.num_data_points = n_total;
        self.stdev = sample_stdev(self.stdev_accumulator, n_total);
    }

    /// Upper-tail probability of a Welch two-sample t-test on the means.
    ///
    /// Identical means score 1. When either side holds a single data point
    /// only exact equality counts, so differing means score 0. An undefined
    /// test (zero spread on both sides, or a placeholder) also scores 0.
    pub fn score(&self, other: &RunningStatistic) -> f64 {
        if self.mean == other.mean {
            return 1.0;
        }
        if self.num_data_points == 1 || other.num_data_points == 1 {
            return 0.0;
        }
        welch_test(&self.summary(), &other.summary())
            .map(|outcome| outcome.upper_tail)
            .filter(|p| !p.is_nan())
            .unwrap_or(0.0)
    }

    /// Two-sided test for equal means at significance `alpha`.
    pub fn similar(&self, other: &RunningStatistic, alpha: f64) -> bool {
        if self.mean == other.mean {
            return true;
        }
        if self.num_data_points == 1 || other.num_data_points == 1 {
            return false;
        }
        self.score(other) > alpha / 2.0
    }

    /// `stdev`, floored at a tenth of the mean.
    pub fn non_zero_stdev(&self) -> f64 {
        let floor = self.mean / 10.0;
        if self.stdev < floor {
            floor
        } else {
            self.stdev
        }
    }

    /// Summary form consumed by the hypothesis tests.
    pub fn summary(&self) -> SampleSummary {
        SampleSummary::new(self.mean, self.variance(), self.num_data_points)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stdev(&self) -> f64 {
        self.stdev
    }

    pub fn variance(&self) -> f64 {
        self.stdev * self.stdev
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn num_data_points(&self) -> usize {
        self.num_data_points
    }

    pub fn stdev_accumulator(&self) -> f64 {
        self.stdev_accumulator
    }

    /// True for the empty-histogram placeholder, which is not a measurement.
    pub fn is_placeholder(&self) -> bool {
        self.num_data_points == 0
    }
}

impl std::fmt::Display for RunningStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "min={} mean={:.3} max={} stdev={:.3} num_data_points={}",
            self.min, self.mean, self.max, self.stdev, self.num_data_points
        )
    }
}
