//! One-way analysis of variance.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::error::{Result, StatsError};

/// Raw outcome of a one-way ANOVA.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anova {
    /// Ratio of between-group to within-group mean squares.
    pub f_statistic: f64,
    /// Upper tail probability of `f_statistic` under F(df_between, df_within).
    pub p_value: f64,
    /// Degrees of freedom between groups (`k - 1`).
    pub df_between: usize,
    /// Degrees of freedom within groups (`N - k`).
    pub df_within: usize,
}

/// Runs a one-way ANOVA over `groups`.
///
/// Every group must be non-empty and there must be at least two groups with
/// more observations in total than groups. When the within-group variance is
/// zero and the means differ, `f_statistic` is `+inf` and `p_value` is `0`;
/// when every observation is identical the test is
/// [`StatsError::DegenerateVariance`].
pub fn one_way_anova(groups: &[&[f64]]) -> Result<Anova> {
    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || groups.iter().any(|g| g.is_empty()) || total <= k {
        return Err(StatsError::InsufficientGroups {
            eligible: groups.iter().filter(|g| !g.is_empty()).count(),
            required: 2,
        });
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / total as f64;
    let (ss_between, ss_within) = groups.iter().fold((0.0, 0.0), |(ssb, ssw), group| {
        let n = group.len() as f64;
        let group_mean = group.iter().sum::<f64>() / n;
        let within: f64 = group.iter().map(|x| (x - group_mean).powi(2)).sum();
        (ssb + n * (group_mean - grand_mean).powi(2), ssw + within)
    });

    let df_between = k - 1;
    let df_within = total - k;

    if ss_within <= 0.0 {
        if ss_between <= 0.0 {
            return Err(StatsError::DegenerateVariance);
        }
        return Ok(Anova {
            f_statistic: f64::INFINITY,
            p_value: 0.0,
            df_between,
            df_within,
        });
    }

    let f_statistic = (ss_between / df_between as f64) / (ss_within / df_within as f64);
    let dist = FisherSnedecor::new(df_between as f64, df_within as f64)
        .map_err(|e| StatsError::Distribution(e.to_string()))?;

    Ok(Anova {
        f_statistic,
        p_value: dist.sf(f_statistic).clamp(0.0, 1.0),
        df_between,
        df_within,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        let result = one_way_anova(&[&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]]).unwrap();
        assert!((result.f_statistic - 1.5).abs() < 1e-12);
        assert!((result.p_value - 0.2879).abs() < 1e-3);
        assert_eq!((result.df_between, result.df_within), (1, 4));
    }

    #[test]
    fn test_separated_means() {
        let result = one_way_anova(&[
            &[0.10, 0.11, 0.09, 0.10],
            &[-0.10, -0.11, -0.09, -0.10],
            &[0.0, 0.01, -0.01, 0.0],
        ])
        .unwrap();
        assert!((result.f_statistic - 600.0).abs() < 1e-6);
        assert!(result.p_value < 1e-6);
    }

    #[test]
    fn test_zero_within_variance() {
        let result = one_way_anova(&[&[0.0, 0.0], &[1.0, 1.0]]).unwrap();
        assert!(result.f_statistic.is_infinite());
        assert_eq!(result.p_value, 0.0);

        let err = one_way_anova(&[&[1.0, 1.0], &[1.0, 1.0]]).unwrap_err();
        assert_eq!(err, StatsError::DegenerateVariance);
    }

    #[test]
    fn test_too_few_groups() {
        let err = one_way_anova(&[&[1.0, 2.0]]).unwrap_err();
        assert!(err.is_insufficient_data());
        assert!(one_way_anova(&[&[1.0], &[2.0]]).is_err());
    }
}
