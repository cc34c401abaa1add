#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/mandate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Period statistics engine.
//!
//! Turns one [`PriceSeries`](mandate_core::PriceSeries) per period into a
//! [`ReturnSeries`](mandate_core::ReturnSeries) and a [`SummaryRecord`], and
//! the set of return series into a [`ComparisonResult`].
//!
//! Every function here is pure: no I/O, no shared state, identical inputs
//! give identical outputs.

/// One-way analysis of variance.
pub mod anova;
/// Chart-ready derived series.
pub mod charts;
/// Cross-period comparison and verdict.
pub mod compare;
/// Error types for the statistics engine.
pub mod error;
/// Sample moments.
pub mod moments;
/// Shapiro-Wilk normality test.
pub mod normality;
/// Return series derived from prices.
pub mod returns;
/// Per-period summary statistics.
pub mod summary;

pub use anova::{Anova, one_way_anova};
pub use charts::{HistogramBin, ROLLING_WINDOW, histogram, rolling_std};
pub use compare::{
    ComparisonResult, MIN_GROUP_SIZE, MIN_GROUPS, SIGNIFICANCE_LEVEL, Verdict, compare,
};
pub use error::{Result, StatsError};
pub use normality::{ShapiroWilk, shapiro_wilk};
pub use returns::{compute_returns, cumulative_performance, pooled_returns, total_performance};
pub use summary::{SummaryRecord, summarize};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mandate_core::PriceSeries;

    const EPS: f64 = 1e-9;

    fn prices(values: &[f64]) -> PriceSeries {
        PriceSeries::from_prices(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values)
    }

    #[test]
    fn test_four_period_scenario() {
        let periods = [
            ("rising", prices(&[100.0, 110.0, 121.0])),
            ("falling", prices(&[100.0, 90.0, 81.0])),
            ("flat", prices(&[100.0, 100.0, 100.0])),
            ("round trip", prices(&[100.0, 105.0, 100.0])),
        ];
        let expected_returns = [[0.10, 0.10], [-0.10, -0.10], [0.0, 0.0], [0.05, -0.047_619]];
        let expected_performance = [0.21, -0.19, 0.0, 0.0];

        let mut all_returns = Vec::new();
        for (i, (label, series)) in periods.iter().enumerate() {
            let returns = compute_returns(series);
            for (got, want) in returns.values().iter().zip(expected_returns[i]) {
                assert!((got - want).abs() < 1e-6, "{label}: {got} != {want}");
            }
            let record = summarize(label, series, &returns);
            assert!((record.total_performance.unwrap() - expected_performance[i]).abs() < EPS);
            all_returns.push((*label, returns));
        }

        let flat = summarize("flat", &periods[2].1, &all_returns[2].1);
        assert_eq!(flat.volatility, Some(0.0));
        assert_eq!(flat.sharpe_ratio, None);

        let outcome = compare(all_returns.iter().map(|(l, r)| (*l, r)));
        let result = outcome.unwrap();
        assert_eq!(result.groups.len(), 4);
        assert!((0.0..=1.0).contains(&result.p_value));
    }

    #[test]
    fn test_single_point_period() {
        let series = prices(&[100.0]);
        let returns = compute_returns(&series);
        let record = summarize("short", &series, &returns);

        assert!(returns.is_empty());
        assert_eq!(record.mean_return, None);
        assert_eq!(record.volatility, None);
        assert_eq!(record.total_performance, None);
        assert_eq!(record.sharpe_ratio, None);
        assert_eq!(record.skewness, None);
        assert_eq!(record.kurtosis, None);
        assert_eq!(record.normality_p_value, None);
    }
}
