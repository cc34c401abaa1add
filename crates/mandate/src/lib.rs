#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/mandate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Compare market index statistics across named periods.
//!
//! This crate ties the workspace together. It re-exports the core types,
//! the statistics engine and the cache implementations, and provides a
//! [`PriceProviderRegistry`] plus an analysis pass that fetches every period,
//! summarizes it and compares the periods with a one-way ANOVA.
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance price provider and the `mandate` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use mandate::{AnalysisConfig, PriceProviderRegistry, render_text, run_analysis};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = PriceProviderRegistry::new().with_yahoo();
//!     let config = AnalysisConfig::french_presidencies();
//!
//!     let report = run_analysis(&registry, &config).await;
//!     println!("{}", render_text(&report));
//! }
//! ```

// Core types and traits
pub use mandate_core::*;

// Statistics engine
pub use mandate_stats::{
    ComparisonResult, HistogramBin, SIGNIFICANCE_LEVEL, StatsError, SummaryRecord, Verdict,
    compare, compute_returns, summarize,
};

// Cache implementations
pub use mandate_cache::{InMemoryCache, NoopCache};

// Providers
#[cfg(feature = "yahoo")]
pub use mandate_yahoo::YahooProvider;

mod analysis;
pub use analysis::{
    AnalysisReport, BestPerformer, ChartData, PeriodChart, PeriodOutcome, analyze, run_analysis,
};

mod config;
pub use config::{AnalysisConfig, ConfigError, DEFAULT_HISTOGRAM_BINS};

mod registry;
pub use registry::PriceProviderRegistry;

mod report;
pub use report::{render_text, to_json};

#[cfg(test)]
mod testing;
