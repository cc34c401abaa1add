//! Per-period summary statistics.

use mandate_core::{PriceSeries, ReturnSeries};
use serde::{Deserialize, Serialize};

use crate::{
    moments::{excess_kurtosis, mean, sample_std, skewness},
    normality::shapiro_wilk,
    returns::total_performance,
};

/// One row of the summary table.
///
/// `None` marks a statistic that is undefined for the period's data; it is
/// never replaced by zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Period label.
    pub label: String,
    /// Number of prices in the period.
    pub observations: usize,
    /// Number of returns in the period.
    pub return_count: usize,
    /// Mean simple return.
    pub mean_return: Option<f64>,
    /// Sample standard deviation of returns.
    pub volatility: Option<f64>,
    /// `last_price / first_price - 1`.
    pub total_performance: Option<f64>,
    /// `mean_return / volatility`.
    pub sharpe_ratio: Option<f64>,
    /// Third standardized moment of returns.
    pub skewness: Option<f64>,
    /// Fourth standardized moment of returns minus 3.
    pub kurtosis: Option<f64>,
    /// Shapiro-Wilk p-value of returns.
    pub normality_p_value: Option<f64>,
}

impl SummaryRecord {
    /// Returns true if no return-based statistic could be computed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.return_count == 0
    }
}

/// Summarizes one period.
///
/// `returns` must have been derived from `prices` with
/// [`compute_returns`](crate::compute_returns). Total performance is read
/// from the prices, every other field from the returns.
#[must_use]
pub fn summarize(label: &str, prices: &PriceSeries, returns: &ReturnSeries) -> SummaryRecord {
    let values = returns.values();

    let mean_return = mean(&values);
    let volatility = sample_std(&values);
    let total_performance = total_performance(prices);
    let sharpe_ratio = match (mean_return, volatility) {
        (Some(m), Some(s)) if s > 0.0 => Some(m / s),
        _ => None,
    };

    SummaryRecord {
        label: label.to_string(),
        observations: prices.len(),
        return_count: values.len(),
        mean_return,
        volatility,
        total_performance,
        sharpe_ratio,
        skewness: skewness(&values),
        kurtosis: excess_kurtosis(&values),
        normality_p_value: shapiro_wilk(&values).map(|t| t.p_value),
    }
}
