//! Plain-text and JSON renderings of an [`AnalysisReport`].

use mandate_stats::{SIGNIFICANCE_LEVEL, Verdict};

use crate::analysis::AnalysisReport;

const NOT_AVAILABLE: &str = "n/a";

/// Renders the summary table, the comparison and the best performer.
#[must_use]
pub fn render_text(report: &AnalysisReport) -> String {
    let mut lines = vec![format!("{} ({})", report.symbol, report.frequency), String::new()];
    lines.extend(summary_table(report));
    lines.push(String::new());
    lines.extend(comparison_lines(report));

    let failed: Vec<String> = report
        .failed_periods()
        .filter_map(|outcome| {
            let error = outcome.fetch_error.as_ref()?;
            Some(format!("Fetch failed for {}: {}", outcome.period.label, error))
        })
        .collect();
    if !failed.is_empty() {
        lines.push(String::new());
        lines.extend(failed);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Serializes the full report, chart data included, as pretty JSON.
pub fn to_json(report: &AnalysisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

fn summary_table(report: &AnalysisReport) -> Vec<String> {
    let width = report
        .periods
        .iter()
        .map(|p| p.period.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("Period".len());

    let header = format!(
        "{:<width$}  {:>5}  {:>9}  {:>9}  {:>10}  {:>7}  {:>8}  {:>8}  {:>8}",
        "Period", "Obs", "Mean", "Vol", "Total", "Sharpe", "Skew", "Kurt", "SW p",
    );
    std::iter::once(header)
        .chain(report.summaries().map(|summary| {
            format!(
                "{:<width$}  {:>5}  {:>9}  {:>9}  {:>10}  {:>7}  {:>8}  {:>8}  {:>8}",
                summary.label,
                summary.observations,
                percent(summary.mean_return),
                percent(summary.volatility),
                percent(summary.total_performance),
                number(summary.sharpe_ratio, 2),
                number(summary.skewness, 3),
                number(summary.kurtosis, 3),
                number(summary.normality_p_value, 4),
            )
        }))
        .collect()
}

fn comparison_lines(report: &AnalysisReport) -> Vec<String> {
    let mut lines = Vec::new();
    match &report.comparison {
        Some(comparison) => {
            lines.push(format!(
                "ANOVA: F({}, {}) = {:.4}, p = {:.4}",
                comparison.df_between,
                comparison.df_within,
                comparison.f_statistic,
                comparison.p_value
            ));
            if !comparison.excluded.is_empty() {
                lines.push(format!("Excluded: {}", comparison.excluded.join(", ")));
            }
        }
        None => {
            let reason = report.comparison_error.as_deref().unwrap_or(NOT_AVAILABLE);
            lines.push(format!("ANOVA: {NOT_AVAILABLE} ({reason})"));
        }
    }
    lines.push(format!("Verdict: {}", verdict_line(report.verdict)));
    lines.push(match &report.best_performer {
        Some(best) => format!(
            "Best performer: {} ({})",
            best.label,
            percent(Some(best.total_performance))
        ),
        None => format!("Best performer: {NOT_AVAILABLE}"),
    });
    lines
}

fn verdict_line(verdict: Verdict) -> String {
    match verdict {
        Verdict::Significant => format!(
            "mean returns differ significantly across periods (p <= {SIGNIFICANCE_LEVEL})"
        ),
        Verdict::NotSignificant => format!(
            "no significant difference in mean returns (p > {SIGNIFICANCE_LEVEL})"
        ),
        Verdict::InsufficientData => "insufficient data to compare periods".to_string(),
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn number(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.decimals$}"))
}
