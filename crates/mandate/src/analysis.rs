//! One full analysis pass: fetch every period, summarize, compare.
//!
//! A failing period never aborts the pass. Its fetch error is recorded, it is
//! analysed as an empty series, and every statistic that needs data reports
//! `None`.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use mandate_core::{DataFrequency, Period, PriceSeries, ReturnSeries, Symbol};
use mandate_stats::{
    ComparisonResult, HistogramBin, ROLLING_WINDOW, SummaryRecord, Verdict, compare,
    compute_returns, cumulative_performance, histogram, pooled_returns, rolling_std, summarize,
};

use crate::{config::AnalysisConfig, registry::PriceProviderRegistry};

/// Everything derived for one period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodOutcome {
    /// The configured period.
    pub period: Period,
    /// Prices retrieved for the period (empty when the fetch failed).
    pub prices: PriceSeries,
    /// Simple returns of `prices`.
    pub returns: ReturnSeries,
    /// Summary statistics row.
    pub summary: SummaryRecord,
    /// Why no prices are available, when the fetch failed.
    pub fetch_error: Option<String>,
}

/// The period with the highest total performance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestPerformer {
    /// Period label.
    pub label: String,
    /// Its total performance.
    pub total_performance: f64,
}

/// Chart-ready series for one period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodChart {
    /// Period label.
    pub label: String,
    /// Display color.
    pub color: String,
    /// Performance of each price relative to the first one.
    pub cumulative: ReturnSeries,
    /// Simple returns.
    pub returns: ReturnSeries,
    /// Rolling sample standard deviation over [`ROLLING_WINDOW`] returns.
    pub rolling_volatility: ReturnSeries,
    /// Distribution of returns.
    pub histogram: Vec<HistogramBin>,
}

/// Chart data for the whole pass. Periods without data are left out.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// One entry per period that has prices.
    pub periods: Vec<PeriodChart>,
    /// Returns of every period, concatenated in period order.
    pub pooled_returns: Vec<f64>,
    /// Distribution of the pooled returns.
    pub pooled_histogram: Vec<HistogramBin>,
}

/// Result of one analysis pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Analysed symbol.
    pub symbol: Symbol,
    /// Sampling interval.
    pub frequency: DataFrequency,
    /// One outcome per configured period, in configuration order.
    pub periods: Vec<PeriodOutcome>,
    /// ANOVA across periods, when it could be run.
    pub comparison: Option<ComparisonResult>,
    /// Why the comparison could not be run.
    pub comparison_error: Option<String>,
    /// Classification of the comparison.
    pub verdict: Verdict,
    /// Period with the best total performance.
    pub best_performer: Option<BestPerformer>,
    /// Chart-ready series.
    pub charts: ChartData,
}

impl AnalysisReport {
    /// Summary rows, in period order.
    pub fn summaries(&self) -> impl Iterator<Item = &SummaryRecord> {
        self.periods.iter().map(|p| &p.summary)
    }

    /// Periods whose fetch failed.
    pub fn failed_periods(&self) -> impl Iterator<Item = &PeriodOutcome> {
        self.periods.iter().filter(|p| p.fetch_error.is_some())
    }
}

/// Runs a full pass: fetches all periods concurrently, then analyses them.
#[instrument(skip_all, fields(symbol = %config.symbol, frequency = %config.frequency))]
pub async fn run_analysis(
    registry: &PriceProviderRegistry,
    config: &AnalysisConfig,
) -> AnalysisReport {
    let fetches = config.periods.iter().map(|period| async move {
        let query = config.query_for(period);
        let result = registry.fetch_prices(&query).await;
        if let Err(e) = &result {
            warn!(period = %period.label, error = %e, "Price fetch failed");
        }
        (period.clone(), result.map_err(|e| e.to_string()))
    });

    let fetched = join_all(fetches).await;
    let report = analyze(config, fetched);

    info!(
        periods = report.periods.len(),
        failed = report.failed_periods().count(),
        verdict = ?report.verdict,
        "Analysis pass complete"
    );
    report
}

/// Analyses already fetched prices.
///
/// Each entry pairs a period with either its prices or the reason they are
/// missing. Order is preserved in the report.
#[must_use]
pub fn analyze(
    config: &AnalysisConfig,
    fetched: Vec<(Period, Result<PriceSeries, String>)>,
) -> AnalysisReport {
    let periods: Vec<PeriodOutcome> = fetched
        .into_iter()
        .map(|(period, result)| {
            let (prices, fetch_error) = match result {
                Ok(prices) => (prices.slice(&period), None),
                Err(e) => (PriceSeries::default(), Some(e)),
            };
            analyze_period(period, prices, fetch_error)
        })
        .collect();

    let outcome = compare(
        periods
            .iter()
            .map(|p| (p.period.label.as_str(), &p.returns)),
    );
    let verdict = Verdict::from_outcome(&outcome);
    let (comparison, comparison_error) = match outcome {
        Ok(result) => (Some(result), None),
        Err(e) => {
            debug!(error = %e, "Comparison not available");
            (None, Some(e.to_string()))
        }
    };

    AnalysisReport {
        symbol: config.symbol.clone(),
        frequency: config.frequency,
        best_performer: best_performer(&periods),
        charts: chart_data(&periods, config.histogram_bins),
        periods,
        comparison,
        comparison_error,
        verdict,
    }
}

fn analyze_period(period: Period, prices: PriceSeries, fetch_error: Option<String>) -> PeriodOutcome {
    let returns = compute_returns(&prices);
    let summary = summarize(&period.label, &prices, &returns);
    debug!(
        period = %period.label,
        prices = prices.len(),
        returns = returns.len(),
        "Summarized period"
    );
    PeriodOutcome {
        period,
        prices,
        returns,
        summary,
        fetch_error,
    }
}

/// First period with the highest defined total performance.
fn best_performer(periods: &[PeriodOutcome]) -> Option<BestPerformer> {
    periods
        .iter()
        .filter_map(|p| Some((p, p.summary.total_performance?)))
        .fold(None, |best: Option<(&PeriodOutcome, f64)>, (p, perf)| match best {
            Some((_, best_perf)) if best_perf >= perf => best,
            _ => Some((p, perf)),
        })
        .map(|(p, perf)| BestPerformer {
            label: p.period.label.clone(),
            total_performance: perf,
        })
}

fn chart_data(periods: &[PeriodOutcome], bins: usize) -> ChartData {
    let with_data: Vec<&PeriodOutcome> = periods.iter().filter(|p| !p.prices.is_empty()).collect();
    let pooled = pooled_returns(with_data.iter().map(|p| &p.returns));

    ChartData {
        periods: with_data
            .iter()
            .map(|p| PeriodChart {
                label: p.period.label.clone(),
                color: p.period.color.clone(),
                cumulative: cumulative_performance(&p.prices),
                returns: p.returns.clone(),
                rolling_volatility: rolling_std(&p.returns, ROLLING_WINDOW),
                histogram: histogram(&p.returns.values(), bins),
            })
            .collect(),
        pooled_histogram: histogram(&pooled, bins),
        pooled_returns: pooled,
    }
}
