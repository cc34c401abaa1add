#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/mandate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance data provider.
//!
//! This crate provides a Yahoo Finance data provider that implements the
//! [`DataProvider`] and [`PriceDataProvider`] traits from `mandate-core`.
//!
//! # Features
//!
//! - Fetch OHLCV data using Yahoo Finance's chart API
//! - Built-in rate limiting (1 request per second by default)
//! - Adjusted close column when Yahoo reports one
//!
//! # Example
//!
//! ```no_run
//! use mandate_yahoo::YahooProvider;
//! use mandate_core::{PriceDataProvider, PriceQuery, Symbol, DataFrequency};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> mandate_core::Result<()> {
//! let provider = YahooProvider::new();
//! let start = NaiveDate::from_ymd_opt(2017, 5, 14).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//! let query = PriceQuery::new(Symbol::new("^FCHI"), start, end, DataFrequency::Monthly);
//!
//! let prices = provider.fetch_prices(&query).await?;
//! println!("Fetched {} prices", prices.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use mandate_core::{
    DataError, DataFrequency, DataProvider, PriceDataProvider, Result, Symbol,
    frame::date_to_epoch_days,
};
use polars::prelude::*;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Default minimum spacing between two requests.
const DEFAULT_RATE_LIMIT: Duration = Duration::from_secs(1);

/// Suggested wait after an HTTP 429.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(60);

/// Default HTTP request timeout.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Provider name used in errors and cache keys.
const PROVIDER_NAME: &str = "Yahoo Finance";

/// Yahoo Finance data provider.
///
/// Implements [`DataProvider`] and [`PriceDataProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit: Duration,
    /// Earliest instant the next request may be sent.
    next_slot: Mutex<Instant>,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(DEFAULT_RATE_LIMIT)
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit: DEFAULT_RATE_LIMIT,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Create a new Yahoo Finance provider with custom rate limiting.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            client,
            rate_limit,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Reserves the next request slot and waits for it.
    ///
    /// Concurrent callers get consecutive slots, so requests stay spaced by
    /// the rate limit even when several periods are fetched at once.
    async fn apply_rate_limit(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = (*next).max(Instant::now());
            *next = slot + self.rate_limit;
            slot
        };

        if slot > Instant::now() {
            debug!(wait_ms = (slot - Instant::now()).as_millis() as u64, "Rate limiting");
            sleep_until(slot).await;
        }
    }

    /// Build the chart API URL for a symbol and date range.
    fn build_chart_url(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> String {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        format!(
            "{}/{}?period1={}&period2={}&interval={}&includeAdjustedClose=true",
            CHART_API_URL,
            encode_symbol(symbol.as_str()),
            start_ts,
            end_ts,
            interval(frequency)
        )
    }

    /// Parse Yahoo Finance chart response into a DataFrame.
    fn parse_chart_response(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        response: ChartResponse,
    ) -> Result<DataFrame> {
        if let Some(error) = response.chart.error {
            return Err(match error.code.as_str() {
                "Not Found" => DataError::SymbolNotFound(symbol.to_string()),
                _ => DataError::Other(format!("{}: {}", error.code, error.description)),
            });
        }

        let result = response
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();

        if timestamps.is_empty() {
            return Err(DataError::DataNotAvailable {
                symbol: symbol.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::Parse("Missing quote data".to_string()))?;

        if quote.close.len() != timestamps.len() {
            return Err(DataError::Parse(format!(
                "{} timestamps but {} closes",
                timestamps.len(),
                quote.close.len()
            )));
        }

        let adj_close = result
            .indicators
            .adjclose
            .and_then(|ac| ac.into_iter().next())
            .map(|ac| ac.adjclose)
            .unwrap_or_default();

        // Bars are stamped at exchange-local midnight; shift before taking the date.
        let gmtoffset = result.meta.map_or(0, |meta| meta.gmtoffset);
        let dates: Vec<Option<i32>> = timestamps
            .iter()
            .map(|&ts| {
                let local = ts.checked_add(gmtoffset)?;
                let dt = Utc.timestamp_opt(local, 0).single()?;
                date_to_epoch_days(dt.date_naive())
            })
            .collect();

        let len = dates.len();
        let opens = pad(quote.open, len);
        let highs = pad(quote.high, len);
        let lows = pad(quote.low, len);
        let volumes: Vec<Option<u64>> = {
            let mut v = quote.volume;
            v.resize(len, None);
            v
        };

        // Fall back to the raw close if Yahoo sent no usable adjusted close
        let adj_closes: Vec<Option<f64>> = if adj_close.len() == len {
            adj_close
        } else {
            quote.close.clone()
        };

        let date_col = Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::Other(e.to_string()))?;

        let df = DataFrame::new(vec![
            date_col,
            Column::new("open".into(), opens),
            Column::new("high".into(), highs),
            Column::new("low".into(), lows),
            Column::new("close".into(), quote.close),
            Column::new("volume".into(), volumes),
            Column::new("adjusted_close".into(), adj_closes),
        ])
        .map_err(|e| DataError::Other(e.to_string()))?;

        debug!(symbol = %symbol, rows = df.height(), "Parsed chart response");
        Ok(df)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Yahoo Finance chart API provider for daily, weekly and monthly prices"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        &DataFrequency::ALL
    }
}

#[async_trait]
impl PriceDataProvider for YahooProvider {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        frequency: DataFrequency,
    ) -> Result<DataFrame> {
        if start > end {
            return Err(DataError::InvalidParameter(format!(
                "{symbol}: period starts on {start} after its end {end}"
            )));
        }

        self.apply_rate_limit().await;

        let url = self.build_chart_url(symbol, start, end, frequency);
        debug!(%symbol, %frequency, url = %url, "Requesting chart");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;
        if let Some(error) = status_error(response.status(), symbol) {
            return Err(error);
        }

        let chart_response: ChartResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(format!("chart response for {symbol}: {e}")))?;
        self.parse_chart_response(symbol, start, end, chart_response)
    }
}

/// Maps a non-success HTTP status to the matching error.
fn status_error(status: reqwest::StatusCode, symbol: &Symbol) -> Option<DataError> {
    match status {
        s if s.is_success() => None,
        reqwest::StatusCode::TOO_MANY_REQUESTS => Some(DataError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after: Some(RATE_LIMIT_BACKOFF),
        }),
        reqwest::StatusCode::NOT_FOUND => Some(DataError::SymbolNotFound(symbol.to_string())),
        s => Some(DataError::Network(format!("HTTP {s} for {symbol}"))),
    }
}

/// Yahoo interval code for a frequency.
const fn interval(frequency: DataFrequency) -> &'static str {
    match frequency {
        DataFrequency::Daily => "1d",
        DataFrequency::Weekly => "1wk",
        DataFrequency::Monthly => "1mo",
    }
}

/// Percent-encodes the characters index tickers use (`^FCHI`, `BRK=B`).
fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E").replace('=', "%3D")
}

fn pad(mut values: Vec<Option<f64>>, len: usize) -> Vec<Option<f64>> {
    values.resize(len, None);
    values
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC, in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandate_core::{PriceField, price_series_from_frame};

    fn dates() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    fn parse(json: serde_json::Value) -> Result<DataFrame> {
        let (start, end) = dates();
        let response: ChartResponse = serde_json::from_value(json).unwrap();
        YahooProvider::new().parse_chart_response(&Symbol::new("^FCHI"), start, end, response)
    }

    #[test]
    fn test_build_chart_url() {
        let provider = YahooProvider::new();
        let symbol = Symbol::new("^fchi");
        let (start, end) = dates();

        let url = provider.build_chart_url(&symbol, start, end, DataFrequency::Monthly);

        assert!(url.contains("/%5EFCHI?"));
        assert!(url.contains("interval=1mo"));
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("includeAdjustedClose=true"));
    }

    #[test]
    fn test_provider_info() {
        let provider = YahooProvider::new();

        assert_eq!(provider.name(), "Yahoo Finance");
        assert!(provider.supports(DataFrequency::Daily));
        assert!(provider.supports(DataFrequency::Weekly));
        assert!(provider.supports(DataFrequency::Monthly));
    }

    #[test]
    fn test_parse_chart_response() {
        // 2024-01-02, 2024-02-01, 2024-03-01 at 08:00 UTC
        let df = parse(serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [1704182400, 1706774400, 1709280000],
                    "indicators": {
                        "quote": [{
                            "open": [7530.0, 7640.0, 7930.0],
                            "high": [7600.0, 7700.0, 8100.0],
                            "low": [7500.0, 7600.0, 7900.0],
                            "close": [7650.0, null, 8200.0],
                            "volume": [1000, 1200, null]
                        }]
                    },
                    "adjclose": null
                }],
                "error": null
            }
        }))
        .unwrap();

        assert_eq!(df.height(), 3);
        let series = price_series_from_frame(&df, PriceField::AdjustedClose).unwrap();
        assert_eq!(series.prices(), vec![7650.0, 8200.0]);
        assert_eq!(
            series.first().unwrap().timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn test_local_midnight_bars_keep_their_date() {
        // 2024-01-01 and 2024-02-01 at 00:00 Paris time
        let df = parse(serde_json::json!({
            "chart": {
                "result": [{
                    "meta": { "gmtoffset": 3600, "exchangeTimezoneName": "Europe/Paris" },
                    "timestamp": [1704063600, 1706742000],
                    "indicators": {
                        "quote": [{ "close": [7543.0, 7656.0] }],
                        "adjclose": [{ "adjclose": [7543.0, 7656.0] }]
                    }
                }],
                "error": null
            }
        }))
        .unwrap();

        let series = price_series_from_frame(&df, PriceField::Close).unwrap();
        let dates: Vec<NaiveDate> = series.iter().map(|p| p.timestamp).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            ]
        );

        let period = mandate_core::Period::new(
            "Q1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            "blue",
        )
        .unwrap();
        assert_eq!(series.slice(&period).len(), 2);
    }

    #[test]
    fn test_parse_empty_range() {
        let err = parse(serde_json::json!({
            "chart": {
                "result": [{ "indicators": { "quote": [{}] } }],
                "error": null
            }
        }))
        .unwrap_err();
        assert!(matches!(err, DataError::DataNotAvailable { .. }));
    }

    #[test]
    fn test_parse_missing_result() {
        let err = parse(serde_json::json!({
            "chart": { "result": null, "error": null }
        }))
        .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_spaces_concurrent_requests() {
        let provider = YahooProvider::with_rate_limit(Duration::from_millis(500));
        let start = Instant::now();

        tokio::join!(
            provider.apply_rate_limit(),
            provider.apply_rate_limit(),
            provider.apply_rate_limit()
        );

        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[test]
    fn test_default() {
        let provider = YahooProvider::default();
        assert_eq!(provider.name(), "Yahoo Finance");
    }
}
