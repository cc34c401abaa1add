//! Error types for the statistics engine.

use thiserror::Error;

/// Errors raised by cross-period tests.
///
/// Per-period statistics never fail: undefined values are reported as `None`
/// in the [`SummaryRecord`](crate::SummaryRecord) instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Fewer groups than the test needs after excluding small groups.
    #[error("Insufficient data: {eligible} eligible group(s), at least {required} required")]
    InsufficientGroups {
        /// Number of groups that passed the size filter.
        eligible: usize,
        /// Minimum number of groups for the test.
        required: usize,
    },

    /// Every observation is identical, so the test statistic is undefined.
    #[error("Degenerate variance: all observations are identical")]
    DegenerateVariance,

    /// A reference distribution could not be constructed.
    #[error("Distribution error: {0}")]
    Distribution(String),
}

impl StatsError {
    /// Returns true if the error means there was not enough data to run the test.
    #[must_use]
    pub const fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            Self::InsufficientGroups { .. } | Self::DegenerateVariance
        )
    }
}

/// Result type alias using [`StatsError`].
pub type Result<T> = std::result::Result<T, StatsError>;
