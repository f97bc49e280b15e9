//! Student's t distribution.
//!
//! Only the pieces the two-sample mean test needs: CDF, survival function
//! and the two-sided p-value. Degrees of freedom may be fractional, which
//! is what the Welch–Satterthwaite approximation produces.

use super::beta::beta_cdf;

/// Upper-tail probability P(T > t) for T ~ t(df).
///
/// Uses P(T > t) = 0.5 * I_{df/(df+t^2)}(df/2, 1/2) for t >= 0 and the
/// reflection 1 - P(T > -t) otherwise.
pub fn students_t_sf(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t == f64::INFINITY {
        return 0.0;
    }
    if t == f64::NEG_INFINITY {
        return 1.0;
    }
    if t < 0.0 {
        return 1.0 - students_t_sf(-t, df);
    }
    if t == 0.0 {
        return 0.5;
    }
    let x = df / (df + t * t);
    0.5 * beta_cdf(x, 0.5 * df, 0.5)
}

/// Cumulative distribution function P(T <= t) for T ~ t(df).
pub fn students_t_cdf(t: f64, df: f64) -> f64 {
    let sf = students_t_sf(t, df);
    if sf.is_nan() {
        return f64::NAN;
    }
    1.0 - sf
}

/// Two-sided p-value P(|T| >= |t|).
pub fn students_t_two_sided(t: f64, df: f64) -> f64 {
    let sf = students_t_sf(t.abs(), df);
    if sf.is_nan() {
        return f64::NAN;
    }
    (2.0 * sf).min(1.0)
}
