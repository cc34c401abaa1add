//! Provider traits for fetching market data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`PriceDataProvider`] - OHLCV price data narrowed to a [`PriceSeries`]

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{
    error::{DataError, Result},
    frame::price_series_from_frame,
    frequency::DataFrequency,
    types::{PriceQuery, PriceSeries, Symbol},
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider and its capabilities.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Yahoo Finance").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the data frequencies supported by this provider.
    fn supported_frequencies(&self) -> &[DataFrequency];

    /// Returns true if this provider can sample at `frequency`.
    fn supports(&self, frequency: DataFrequency) -> bool {
        self.supported_frequencies().contains(&frequency)
    }
}

/// Provider for OHLCV price data.
///
/// Implement this trait to provide historical price data.
#[async_trait]
pub trait PriceDataProvider: DataProvider {
    /// Fetches OHLCV data for a single symbol.
    ///
    /// Returns a DataFrame with columns: date, open, high, low, close, volume, adjusted_close.
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> Result<DataFrame>;

    /// Fetches one price column as an ordered [`PriceSeries`].
    ///
    /// Default implementation calls `fetch_ohlcv` and narrows the frame to the
    /// column selected by `query.field`. An empty frame yields
    /// [`DataError::DataNotAvailable`].
    async fn fetch_prices(&self, query: &PriceQuery) -> Result<PriceSeries> {
        if !self.supports(query.frequency) {
            return Err(DataError::InvalidParameter(format!(
                "{} does not support {} data",
                self.name(),
                query.frequency
            )));
        }

        let df = self
            .fetch_ohlcv(&query.symbol, query.start, query.end, query.frequency)
            .await?;
        let series = price_series_from_frame(&df, query.field)?;

        if series.is_empty() {
            return Err(DataError::DataNotAvailable {
                symbol: query.symbol.to_string(),
                start: query.start.to_string(),
                end: query.end.to_string(),
            });
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::date_to_epoch_days;
    use crate::types::PriceField;
    use polars::prelude::*;

    #[derive(Debug)]
    struct FixedProvider {
        closes: Vec<f64>,
    }

    impl DataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn description(&self) -> &str {
            "Returns a fixed daily close series"
        }

        fn supported_frequencies(&self) -> &[DataFrequency] {
            &[DataFrequency::Daily]
        }
    }

    #[async_trait]
    impl PriceDataProvider for FixedProvider {
        async fn fetch_ohlcv(
            &self,
            _symbol: &Symbol,
            start: NaiveDate,
            _end: NaiveDate,
            _frequency: DataFrequency,
        ) -> Result<DataFrame> {
            let first = date_to_epoch_days(start)
                .ok_or_else(|| DataError::InvalidParameter(format!("date out of range: {start}")))?;
            let dates: Vec<i32> = (0..self.closes.len() as i32).map(|i| first + i).collect();
            DataFrame::new(vec![
                Column::new("date".into(), dates)
                    .cast(&DataType::Date)
                    .map_err(|e| DataError::Other(e.to_string()))?,
                Column::new("close".into(), self.closes.clone()),
            ])
            .map_err(|e| DataError::Other(e.to_string()))
        }
    }

    fn query(frequency: DataFrequency) -> PriceQuery {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        PriceQuery::new(Symbol::new("^FCHI"), start, end, frequency).with_field(PriceField::Close)
    }

    #[tokio::test]
    async fn test_fetch_prices_narrows_frame() {
        let provider = FixedProvider {
            closes: vec![100.0, 110.0, 121.0],
        };
        let series = provider.fetch_prices(&query(DataFrequency::Daily)).await.unwrap();
        assert_eq!(series.prices(), vec![100.0, 110.0, 121.0]);
    }

    #[tokio::test]
    async fn test_fetch_prices_empty_is_unavailable() {
        let provider = FixedProvider { closes: vec![] };
        let err = provider
            .fetch_prices(&query(DataFrequency::Daily))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_fetch_prices_rejects_unsupported_frequency() {
        let provider = FixedProvider {
            closes: vec![100.0],
        };
        let err = provider
            .fetch_prices(&query(DataFrequency::Monthly))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidParameter(_)));
    }
}
