//! Analysis configuration: symbol, sampling interval and named periods.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mandate_core::{DataFrequency, Period, PriceField, PriceQuery, Symbol};

/// Default number of histogram bins in chart data.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for [`AnalysisConfig`].
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but is not usable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Immutable inputs of one analysis pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Index or ticker to analyse.
    pub symbol: Symbol,
    /// Sampling interval of the price history.
    #[serde(default)]
    pub frequency: DataFrequency,
    /// Price column to analyse.
    #[serde(default)]
    pub price_field: PriceField,
    /// Number of bins in every histogram of the chart data.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Named periods, in display order.
    pub periods: Vec<Period>,
}

const fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::french_presidencies()
    }
}

impl AnalysisConfig {
    /// The CAC 40 sampled monthly over the French presidential terms since 1995.
    #[must_use]
    pub fn french_presidencies() -> Self {
        let terms = [
            ("Jacques Chirac", (1995, 5, 17), (2007, 5, 16), "blue"),
            ("Nicolas Sarkozy", (2007, 5, 16), (2012, 5, 15), "green"),
            ("François Hollande", (2012, 5, 15), (2017, 5, 14), "orange"),
            ("Emmanuel Macron", (2017, 5, 14), (2024, 12, 31), "red"),
        ];

        Self {
            symbol: Symbol::new("^FCHI"),
            frequency: DataFrequency::Monthly,
            price_field: PriceField::Close,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            periods: terms
                .into_iter()
                .filter_map(|(label, start, end, color)| {
                    Some(Period {
                        label: label.to_string(),
                        start: ymd(start)?,
                        end: ymd(end)?,
                        color: color.to_string(),
                    })
                })
                .collect(),
        }
    }

    /// Parses and validates a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.symbol = Symbol::new(config.symbol.as_str());
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Checks that the configuration can drive an analysis pass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".to_string()));
        }
        if self.periods.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one period is required".to_string(),
            ));
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid(
                "histogram_bins must be positive".to_string(),
            ));
        }

        let mut labels = HashSet::new();
        for period in &self.periods {
            period
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            if !labels.insert(period.label.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate period label '{}'",
                    period.label
                )));
            }
        }
        Ok(())
    }

    /// Replaces the symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    /// Replaces the sampling interval.
    #[must_use]
    pub fn with_frequency(mut self, frequency: DataFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Replaces the price column.
    #[must_use]
    pub fn with_price_field(mut self, price_field: PriceField) -> Self {
        self.price_field = price_field;
        self
    }

    /// The price request covering `period`.
    #[must_use]
    pub fn query_for(&self, period: &Period) -> PriceQuery {
        PriceQuery::for_period(self.symbol.clone(), period, self.frequency)
            .with_field(self.price_field)
    }
}

fn ymd((y, m, d): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}
