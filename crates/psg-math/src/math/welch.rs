//! Welch's unequal-variance t-test for two summarized samples.
//!
//! Inputs are sample summaries (mean, sample variance, count) rather than
//! raw observations so callers holding bounded-memory accumulators can use
//! them directly.

use serde::{Deserialize, Serialize};

use super::students_t::students_t_sf;

/// Summary of one side of a two-sample comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub mean: f64,
    /// Sample (Bessel-corrected) variance.
    pub variance: f64,
    pub count: usize,
}

impl SampleSummary {
    pub fn new(mean: f64, variance: f64, count: usize) -> Self {
        Self {
            mean,
            variance,
            count,
        }
    }

    fn squared_standard_error(&self) -> f64 {
        self.variance / self.count as f64
    }
}

/// Outcome of a Welch test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelchOutcome {
    /// t statistic, (mean_a - mean_b) / sqrt(var_a/n_a + var_b/n_b).
    pub t: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    /// Upper-tail probability of |t| under t(df).
    pub upper_tail: f64,
}

/// Welch–Satterthwaite degrees of freedom.
///
/// Returns NaN when either count is below 2 or both variances are zero.
pub fn welch_df(a: &SampleSummary, b: &SampleSummary) -> f64 {
    if a.count < 2 || b.count < 2 {
        return f64::NAN;
    }
    let se_a = a.squared_standard_error();
    let se_b = b.squared_standard_error();
    let numerator = (se_a + se_b) * (se_a + se_b);
    let denominator =
        se_a * se_a / (a.count - 1) as f64 + se_b * se_b / (b.count - 1) as f64;
    if denominator == 0.0 {
        return f64::NAN;
    }
    numerator / denominator
}

/// Run Welch's test. `None` when the test is undefined: fewer than two
/// observations on a side, or zero pooled standard error.
pub fn welch_test(a: &SampleSummary, b: &SampleSummary) -> Option<WelchOutcome> {
    if a.count < 2 || b.count < 2 {
        return None;
    }
    let se = (a.squared_standard_error() + b.squared_standard_error()).sqrt();
    if se == 0.0 || !se.is_finite() {
        return None;
    }
    let df = welch_df(a, b);
    if !df.is_finite() {
        return None;
    }
    let t = (a.mean - b.mean) / se;
    Some(WelchOutcome {
        t,
        df,
        upper_tail: students_t_sf(t.abs(), df),
    })
}
