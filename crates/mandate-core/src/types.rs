//! Core data types for per-period market analysis.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Period`] - Named analysis window
//! - [`PriceField`] - Which price column a series is built from
//! - [`PriceQuery`] - Parameters of one price request
//! - [`PricePoint`] / [`PriceSeries`] - Time-ordered prices
//! - [`ReturnPoint`] / [`ReturnSeries`] - Simple returns derived from prices

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;
use crate::frequency::DataFrequency;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A labeled, fixed date range used to partition a price history.
///
/// The color is presentational only and never takes part in any computation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Display label (e.g. the office holder's name).
    pub label: String,
    /// First day of the window, inclusive.
    pub start: NaiveDate,
    /// Last day of the window, inclusive.
    pub end: NaiveDate,
    /// Display color for charts.
    #[serde(default)]
    pub color: String,
}

impl Period {
    /// Creates a new period.
    ///
    /// Fails with [`DataError::InvalidParameter`] when `start` is after `end`
    /// or the label is blank.
    pub fn new(
        label: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        color: impl Into<String>,
    ) -> crate::Result<Self> {
        let period = Self {
            label: label.into(),
            start,
            end,
            color: color.into(),
        };
        period.validate()?;
        Ok(period)
    }

    /// Checks the label and date bounds.
    pub fn validate(&self) -> crate::Result<()> {
        if self.label.trim().is_empty() {
            return Err(DataError::InvalidParameter(
                "period label must not be empty".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(DataError::InvalidParameter(format!(
                "period '{}' starts on {} after its end {}",
                self.label, self.start, self.end
            )));
        }
        Ok(())
    }

    /// Returns true if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Which price column a series is built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    /// Raw closing price.
    #[default]
    Close,
    /// Split/dividend adjusted closing price.
    AdjustedClose,
}

impl PriceField {
    /// Column name of this field in an OHLCV frame.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::AdjustedClose => "adjusted_close",
        }
    }
}

impl FromStr for PriceField {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "close" => Ok(Self::Close),
            "adjusted" | "adjusted_close" | "adj_close" => Ok(Self::AdjustedClose),
            other => Err(DataError::InvalidParameter(format!(
                "unknown price field '{other}', expected close or adjusted"
            ))),
        }
    }
}

/// Parameters of one price request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceQuery {
    /// Symbol to fetch.
    pub symbol: Symbol,
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
    /// Sampling interval.
    pub frequency: DataFrequency,
    /// Price column to extract.
    pub field: PriceField,
}

impl PriceQuery {
    /// Creates a query for the closing price.
    #[must_use]
    pub const fn new(
        symbol: Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> Self {
        Self {
            symbol,
            start,
            end,
            frequency,
            field: PriceField::Close,
        }
    }

    /// Creates the query covering one period.
    #[must_use]
    pub fn for_period(symbol: Symbol, period: &Period, frequency: DataFrequency) -> Self {
        Self::new(symbol, period.start, period.end, frequency)
    }

    /// Sets the price column.
    #[must_use]
    pub const fn with_field(mut self, field: PriceField) -> Self {
        self.field = field;
        self
    }
}

/// One price observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date.
    pub timestamp: NaiveDate,
    /// Observed price.
    pub price: f64,
}

impl PricePoint {
    /// Creates a new price point.
    #[must_use]
    pub const fn new(timestamp: NaiveDate, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Strictly time-ordered prices for one period.
///
/// Construction sorts the points by timestamp, drops non-finite and
/// non-positive prices and keeps the last observation for a repeated
/// timestamp, so every `PriceSeries` is strictly increasing in time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a series from arbitrary points, normalizing them.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.price.is_finite() && p.price > 0.0)
            .collect();
        // stable sort keeps input order among equal timestamps
        points.sort_by_key(|p| p.timestamp);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }
        Self { points: deduped }
    }

    /// Creates a series of consecutive daily observations starting at `start`.
    #[must_use]
    pub fn from_prices(start: NaiveDate, prices: &[f64]) -> Self {
        Self::from_points(
            start
                .iter_days()
                .zip(prices.iter())
                .map(|(day, &price)| PricePoint::new(day, price)),
        )
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the observations.
    #[must_use]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Returns an iterator over the observations.
    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    /// Returns the prices without their timestamps.
    #[must_use]
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Returns the first observation.
    #[must_use]
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Returns the last observation.
    #[must_use]
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Returns the dates of the first and last observations.
    #[must_use]
    pub fn time_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }

    /// Returns the sub-series that falls inside `period`.
    #[must_use]
    pub fn slice(&self, period: &Period) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| period.contains(p.timestamp))
                .copied()
                .collect(),
        }
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}

impl IntoIterator for PriceSeries {
    type Item = PricePoint;
    type IntoIter = std::vec::IntoIter<PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

/// One simple return, stamped with the date of its closing observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// Date of the later of the two prices.
    pub timestamp: NaiveDate,
    /// `price[i] / price[i-1] - 1`.
    pub value: f64,
}

/// Ordered simple returns derived from a [`PriceSeries`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Creates an empty return series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a return series from already computed points.
    #[must_use]
    pub const fn from_points(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    /// Returns the number of returns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no returns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the return points.
    #[must_use]
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    /// Returns the return values without their timestamps.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|r| r.value).collect()
    }

    /// Returns an iterator over the return points.
    pub fn iter(&self) -> impl Iterator<Item = &ReturnPoint> {
        self.points.iter()
    }
}
