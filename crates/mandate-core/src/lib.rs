#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/mandate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for per-period market statistics.
//!
//! This crate provides the foundational abstractions shared by the workspace:
//!
//! - [`DataProvider`](provider::DataProvider) - Base trait for all providers
//! - [`PriceDataProvider`](provider::PriceDataProvider) - OHLCV price data
//! - [`DataCache`](cache::DataCache) - Caching abstraction
//! - [`PriceSeries`](types::PriceSeries) and [`ReturnSeries`](types::ReturnSeries)
//! - [`Period`](types::Period) - Named analysis window

/// Cache trait for storing fetched data.
pub mod cache;
/// Error types for data operations.
pub mod error;
/// OHLCV frame to price series conversion.
pub mod frame;
/// Sampling interval definitions.
pub mod frequency;
/// Provider traits for fetching market data.
pub mod provider;
/// Core data types (Symbol, Period, PriceSeries, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::DataCache;
pub use error::{DataError, Result};
pub use frame::price_series_from_frame;
pub use frequency::DataFrequency;
pub use provider::{DataProvider, PriceDataProvider};
pub use types::{
    Period, PriceField, PricePoint, PriceQuery, PriceSeries, ReturnPoint, ReturnSeries, Symbol,
};
