//! Return series derived from prices.

use mandate_core::{PriceSeries, ReturnPoint, ReturnSeries};

/// Computes simple returns `price[i] / price[i-1] - 1`.
///
/// The first observation has no return and is dropped, so the result has
/// `len(prices) - 1` points, stamped with the date of the later price.
/// Empty and single-point series give an empty result.
#[must_use]
pub fn compute_returns(prices: &PriceSeries) -> ReturnSeries {
    ReturnSeries::from_points(
        prices
            .points()
            .windows(2)
            .map(|pair| ReturnPoint {
                timestamp: pair[1].timestamp,
                value: pair[1].price / pair[0].price - 1.0,
            })
            .collect(),
    )
}

/// Total compounded performance `last / first - 1`, `None` below two prices.
#[must_use]
pub fn total_performance(prices: &PriceSeries) -> Option<f64> {
    if prices.len() < 2 {
        return None;
    }
    Some(prices.last()?.price / prices.first()?.price - 1.0)
}

/// Cumulative performance of every observation relative to the first one.
///
/// The first point is always `0.0`; an empty series gives an empty result.
#[must_use]
pub fn cumulative_performance(prices: &PriceSeries) -> ReturnSeries {
    let Some(base) = prices.first().map(|p| p.price) else {
        return ReturnSeries::new();
    };
    ReturnSeries::from_points(
        prices
            .iter()
            .map(|p| ReturnPoint {
                timestamp: p.timestamp,
                value: p.price / base - 1.0,
            })
            .collect(),
    )
}

/// Concatenates the values of several return series, in order.
#[must_use]
pub fn pooled_returns<'a>(series: impl IntoIterator<Item = &'a ReturnSeries>) -> Vec<f64> {
    series
        .into_iter()
        .flat_map(|s| s.iter().map(|r| r.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const EPS: f64 = 1e-12;

    fn series(prices: &[f64]) -> PriceSeries {
        PriceSeries::from_prices(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), prices)
    }

    #[test]
    fn test_returns_length_and_values() {
        let prices = series(&[100.0, 110.0, 99.0, 120.0]);
        let returns = compute_returns(&prices);

        assert_eq!(returns.len(), 3);
        let p = prices.prices();
        for (i, r) in returns.values().iter().enumerate() {
            let expected = (p[i + 1] - p[i]) / p[i];
            assert!((r - expected).abs() < EPS);
        }
        assert_eq!(returns.points()[0].timestamp, prices.points()[1].timestamp);
    }

    #[test]
    fn test_short_series_have_no_returns() {
        assert!(compute_returns(&series(&[])).is_empty());
        assert!(compute_returns(&series(&[100.0])).is_empty());
    }

    #[test]
    fn test_total_performance_uses_prices() {
        assert!((total_performance(&series(&[100.0, 110.0, 121.0])).unwrap() - 0.21).abs() < EPS);
        assert!((total_performance(&series(&[100.0, 105.0, 100.0])).unwrap()).abs() < EPS);
        assert_eq!(total_performance(&series(&[100.0])), None);
    }

    #[test]
    fn test_cumulative_performance() {
        let cumulative = cumulative_performance(&series(&[100.0, 90.0, 81.0]));
        let values = cumulative.values();
        assert_eq!(values[0], 0.0);
        assert!((values[2] + 0.19).abs() < EPS);
        assert!(cumulative_performance(&series(&[])).is_empty());
    }

    #[test]
    fn test_pooled_returns_keeps_order() {
        let a = compute_returns(&series(&[100.0, 110.0]));
        let b = compute_returns(&series(&[100.0, 90.0]));
        let pooled = pooled_returns([&a, &b]);
        assert_eq!(pooled.len(), 2);
        assert!(pooled[0] > 0.0 && pooled[1] < 0.0);
    }
}
