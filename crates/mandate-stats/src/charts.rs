//! Chart-ready series derived from returns.
//!
//! Nothing here draws anything; the output is handed to an external plotting
//! layer.

use mandate_core::{ReturnPoint, ReturnSeries};
use serde::{Deserialize, Serialize};

use crate::moments::sample_std;

/// Window length, in observations, of the rolling volatility chart.
pub const ROLLING_WINDOW: usize = 12;

/// Rolling sample standard deviation over full windows of `window` returns.
///
/// Each value is stamped with the date of the last return in its window.
/// Series shorter than the window, and windows below two observations, give
/// an empty result.
#[must_use]
pub fn rolling_std(returns: &ReturnSeries, window: usize) -> ReturnSeries {
    if window < 2 {
        return ReturnSeries::new();
    }
    ReturnSeries::from_points(
        returns
            .points()
            .windows(window)
            .filter_map(|w| {
                let values: Vec<f64> = w.iter().map(|r| r.value).collect();
                Some(ReturnPoint {
                    timestamp: w.last()?.timestamp,
                    value: sample_std(&values)?,
                })
            })
            .collect(),
    )
}

/// One histogram bar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Upper edge, exclusive except for the last bin.
    pub upper: f64,
    /// Number of values in the bin.
    pub count: usize,
}

/// Equal-width histogram of `values` over `[min, max]`.
///
/// A constant sample is spread over `[v - 0.5, v + 0.5]`. Non-finite values
/// are ignored; an empty input or `bins == 0` gives no bins.
#[must_use]
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn returns(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ReturnSeries::from_points(
            start
                .iter_days()
                .zip(values)
                .map(|(timestamp, &value)| ReturnPoint { timestamp, value })
                .collect(),
        )
    }

    #[test]
    fn test_rolling_std_window() {
        let values: Vec<f64> = (0..14).map(|i| if i % 2 == 0 { 0.01 } else { -0.01 }).collect();
        let series = returns(&values);
        let rolling = rolling_std(&series, ROLLING_WINDOW);

        assert_eq!(rolling.len(), 3);
        assert_eq!(rolling.points()[0].timestamp, series.points()[11].timestamp);
        assert_eq!(rolling.points()[2].timestamp, series.points()[13].timestamp);
        assert!(rolling.values().iter().all(|v| *v > 0.0));
    }

    #[test]
    fn test_rolling_std_short_series() {
        assert!(rolling_std(&returns(&[0.01; 11]), ROLLING_WINDOW).is_empty());
        assert!(rolling_std(&returns(&[0.01; 20]), 1).is_empty());
    }

    #[test]
    fn test_histogram_counts() {
        let bins = histogram(&[0.0, 0.1, 0.2, 0.3, 0.4, 1.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 5);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[1].upper, 1.0);
    }

    #[test]
    fn test_histogram_constant_and_empty() {
        let bins = histogram(&[0.0, 0.0], 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(bins[0].lower, -0.5);
        assert!(histogram(&[], 4).is_empty());
        assert!(histogram(&[1.0], 0).is_empty());
    }
}
