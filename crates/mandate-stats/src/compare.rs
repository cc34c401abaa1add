//! Cross-period comparison of mean returns.

use mandate_core::ReturnSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::{
    anova::one_way_anova,
    error::{Result, StatsError},
};

/// p-values at or below this level are classified as significant.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Groups need at least this many returns to take part in the test.
pub const MIN_GROUP_SIZE: usize = 2;

/// Groups needed for a comparison.
pub const MIN_GROUPS: usize = 2;

/// Outcome of a one-way ANOVA across periods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// F-statistic, `>= 0` (`+inf` when every group is constant but the means differ).
    pub f_statistic: f64,
    /// p-value in `[0, 1]`.
    pub p_value: f64,
    /// Degrees of freedom between groups.
    pub df_between: usize,
    /// Degrees of freedom within groups.
    pub df_within: usize,
    /// Labels of the periods that took part, in input order.
    pub groups: Vec<String>,
    /// Labels of the periods left out for having too few returns.
    pub excluded: Vec<String>,
}

impl ComparisonResult {
    /// Returns true if `p_value <= SIGNIFICANCE_LEVEL`.
    #[must_use]
    pub fn is_significant(&self) -> bool {
        self.p_value <= SIGNIFICANCE_LEVEL
    }
}

/// Classification shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Mean returns differ significantly between periods.
    Significant,
    /// No significant difference between mean returns.
    NotSignificant,
    /// Not enough data to run the test.
    InsufficientData,
}

impl Verdict {
    /// Classifies the outcome of [`compare`].
    ///
    /// Any error is reported as [`Verdict::InsufficientData`].
    #[must_use]
    pub fn from_outcome(outcome: &Result<ComparisonResult>) -> Self {
        match outcome {
            Ok(result) if result.is_significant() => Self::Significant,
            Ok(_) => Self::NotSignificant,
            Err(_) => Self::InsufficientData,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Significant => "significant difference between periods",
            Self::NotSignificant => "no significant difference between periods",
            Self::InsufficientData => "not enough data to compare periods",
        })
    }
}

/// Tests whether all periods share the same mean return.
///
/// Periods with fewer than [`MIN_GROUP_SIZE`] returns are excluded first.
/// Fewer than [`MIN_GROUPS`] remaining periods give
/// [`StatsError::InsufficientGroups`].
pub fn compare<'a>(
    returns_by_period: impl IntoIterator<Item = (&'a str, &'a ReturnSeries)>,
) -> Result<ComparisonResult> {
    let mut groups = Vec::new();
    let mut labels = Vec::new();
    let mut excluded = Vec::new();

    for (label, returns) in returns_by_period {
        if returns.len() < MIN_GROUP_SIZE {
            debug!(period = label, returns = returns.len(), "Excluding period from comparison");
            excluded.push(label.to_string());
            continue;
        }
        groups.push(returns.values());
        labels.push(label.to_string());
    }

    if groups.len() < MIN_GROUPS {
        return Err(StatsError::InsufficientGroups {
            eligible: groups.len(),
            required: MIN_GROUPS,
        });
    }

    let slices: Vec<&[f64]> = groups.iter().map(Vec::as_slice).collect();
    let anova = one_way_anova(&slices)?;

    Ok(ComparisonResult {
        f_statistic: anova.f_statistic,
        p_value: anova.p_value,
        df_between: anova.df_between,
        df_within: anova.df_within,
        groups: labels,
        excluded,
    })
}
