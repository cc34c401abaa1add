//! Shapiro-Wilk normality test.
//!
//! Coefficients and the p-value follow Royston's 1995 approximation
//! (Applied Statistics algorithm AS R94), valid for 3 to 5000 observations.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Smallest sample the test accepts.
pub const MIN_SAMPLE_SIZE: usize = 3;

/// Largest sample the approximation is valid for.
pub const MAX_SAMPLE_SIZE: usize = 5000;

const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_190, 4.434_685, -2.706_056];
const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
const C3: [f64; 4] = [0.544, -0.399_78, 0.025_054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.778_57, 0.062_767, -0.002_032_2];
const C5: [f64; 4] = [-1.5861, -0.310_82, -0.083_751, 0.003_891_5];
const C6: [f64; 3] = [-0.4803, -0.082_676, 0.003_030_2];
const G: [f64; 2] = [-2.273, 0.459];

/// Outcome of a Shapiro-Wilk test.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapiroWilk {
    /// The W statistic, in `(0, 1]`.
    pub w: f64,
    /// Probability of a W this small under normality.
    pub p_value: f64,
}

/// Runs the Shapiro-Wilk test on `values`.
///
/// Returns `None` when the sample size is outside
/// [`MIN_SAMPLE_SIZE`]..=[`MAX_SAMPLE_SIZE`], when any value is not finite,
/// or when all values are identical.
#[must_use]
pub fn shapiro_wilk(values: &[f64]) -> Option<ShapiroWilk> {
    let n = values.len();
    if !(MIN_SAMPLE_SIZE..=MAX_SAMPLE_SIZE).contains(&n) || values.iter().any(|v| !v.is_finite())
    {
        return None;
    }

    let mut x = values.to_vec();
    x.sort_by(f64::total_cmp);
    let range = x[n - 1] - x[0];
    if range <= f64::EPSILON * x[n - 1].abs().max(x[0].abs()) {
        return None;
    }

    let std_normal = Normal::new(0.0, 1.0).ok()?;
    let a = coefficients(n, &std_normal);

    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / ssq).min(1.0);

    Some(ShapiroWilk {
        w,
        p_value: p_value(w, n, &std_normal).clamp(0.0, 1.0),
    })
}

/// Coefficients for the upper half of the order statistics, largest first.
fn coefficients(n: usize, std_normal: &Normal) -> Vec<f64> {
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let an = n as f64;
    let half = n / 2;
    let m: Vec<f64> = (1..=half)
        .map(|i| std_normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
        .collect();

    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    let mut a = vec![0.0; half];
    a[0] = a1;
    let first_scaled = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        2
    } else {
        1
    };
    let fac = if n > 5 {
        ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a[1] * a[1]))
            .sqrt()
    } else {
        ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt()
    };
    for (ai, mi) in a.iter_mut().zip(&m).skip(first_scaled) {
        *ai = -mi / fac;
    }
    a
}

fn p_value(w: f64, n: usize, std_normal: &Normal) -> f64 {
    if n == 3 {
        // exact distribution for three observations
        let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - 0.75_f64.sqrt().asin());
        return p.max(0.0);
    }

    let an = n as f64;
    let mut y = (1.0 - w).ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 0.0;
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };
    std_normal.sf((y - m) / s)
}

/// Evaluates `c[0] + c[1] x + c[2] x^2 + ...`.
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sample() {
        let weights = [
            148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
        ];
        let result = shapiro_wilk(&weights).unwrap();
        assert!((result.w - 0.7888).abs() < 1e-3);
        assert!((result.p_value - 0.0067).abs() < 5e-4);
    }

    #[test]
    fn test_three_points_exact() {
        let result = shapiro_wilk(&[1.0, 2.0, 4.0]).unwrap();
        assert!((result.w - 0.9643).abs() < 1e-3);
        assert!((result.p_value - 0.6369).abs() < 1e-3);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = shapiro_wilk(&[4.0, 2.0, 9.0, 5.0, 7.0, 4.0, 5.0, 4.0]).unwrap();
        let b = shapiro_wilk(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(a, b);
        assert!((a.w - 0.9166).abs() < 1e-3);
    }

    #[test]
    fn test_bell_shaped_sample_not_rejected() {
        let returns = [
            -1.2, 0.3, 0.8, -0.4, 0.1, 1.5, -0.9, 0.0, 0.6, -0.2, 0.4, -0.7, 1.1, -1.6, 0.2, 0.9,
            -0.3, 0.5, -0.1, 0.7,
        ]
        .map(|v| v * 0.01);
        let result = shapiro_wilk(&returns).unwrap();
        assert!(result.p_value > 0.5);
    }

    #[test]
    fn test_heavy_tail_rejected() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 50.0, 100.0, 1000.0];
        let result = shapiro_wilk(&values).unwrap();
        assert!(result.p_value < 1e-4);
    }

    #[test]
    fn test_undefined_inputs() {
        assert_eq!(shapiro_wilk(&[]), None);
        assert_eq!(shapiro_wilk(&[0.1, 0.2]), None);
        assert_eq!(shapiro_wilk(&[0.0, 0.0, 0.0, 0.0]), None);
        assert_eq!(shapiro_wilk(&[0.1, f64::NAN, 0.2]), None);
    }
}
