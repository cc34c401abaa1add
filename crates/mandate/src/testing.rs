//! In-process price provider for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::DataFrame;

use mandate_core::{
    DataError, DataFrequency, DataProvider, PriceDataProvider, PriceQuery, PriceSeries, Result,
    Symbol,
};

/// Serves fixed daily prices keyed by the start date of the query.
#[derive(Debug)]
pub(crate) struct MockProvider {
    name: String,
    prices: HashMap<NaiveDate, Vec<f64>>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prices: HashMap::new(),
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every request fails with a network error.
    pub(crate) fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub(crate) fn with_prices(mut self, start: NaiveDate, prices: &[f64]) -> Self {
        self.prices.insert(start, prices.to_vec());
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DataProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "In-memory test provider"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        &DataFrequency::ALL
    }
}

#[async_trait]
impl PriceDataProvider for MockProvider {
    async fn fetch_ohlcv(
        &self,
        _symbol: &Symbol,
        _start: NaiveDate,
        _end: NaiveDate,
        _frequency: DataFrequency,
    ) -> Result<DataFrame> {
        Err(DataError::Other(
            "MockProvider serves price series only".to_string(),
        ))
    }

    async fn fetch_prices(&self, query: &PriceQuery) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(DataError::Network(format!("{} is down", self.name)));
        }
        match self.prices.get(&query.start) {
            Some(prices) => Ok(PriceSeries::from_prices(query.start, prices)),
            None => Err(DataError::DataNotAvailable {
                symbol: query.symbol.to_string(),
                start: query.start.to_string(),
                end: query.end.to_string(),
            }),
        }
    }
}
