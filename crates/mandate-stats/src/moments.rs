//! Sample moments of a slice of observations.
//!
//! Conventions: volatility is the sample standard deviation (denominator
//! `n - 1`); skewness and excess kurtosis use the biased central moments
//! `m3 / m2^1.5` and `m4 / m2^2 - 3`. Every function returns `None` when the
//! statistic is undefined for the input.

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample variance, `None` below two observations.
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|&x| (x - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation, `None` below two observations.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Biased central moments `(mean, m2, m3, m4)`.
#[must_use]
pub fn central_moments(values: &[f64]) -> Option<(f64, f64, f64, f64)> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let (m2, m3, m4) = values.iter().fold((0.0, 0.0, 0.0), |(s2, s3, s4), &x| {
        let d = x - m;
        let d2 = d * d;
        (s2 + d2, s3 + d2 * d, s4 + d2 * d2)
    });
    Some((m, m2 / n, m3 / n, m4 / n))
}

/// Skewness (third standardized moment), `None` when the variance is zero.
#[must_use]
pub fn skewness(values: &[f64]) -> Option<f64> {
    let (_, m2, m3, _) = central_moments(values)?;
    if m2 <= 0.0 {
        return None;
    }
    Some(m3 / m2.powf(1.5))
}

/// Excess kurtosis (fourth standardized moment minus 3), `None` when the variance is zero.
#[must_use]
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let (_, m2, _, m4) = central_moments(values)?;
    if m2 <= 0.0 {
        return None;
    }
    Some(m4 / (m2 * m2) - 3.0)
}
