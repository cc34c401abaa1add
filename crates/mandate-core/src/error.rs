//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when fetching, converting, or caching price data.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, HTTP errors, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<Duration>,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Data is not available for the requested symbol and date range.
    #[error("Data not available for {symbol} in range {start} to {end}")]
    DataNotAvailable {
        /// The symbol that was requested.
        symbol: String,
        /// Start of the requested date range.
        start: String,
        /// End of the requested date range.
        end: String,
    },

    /// A provider did not answer within the configured deadline.
    #[error("Request to {provider} timed out after {after:?}")]
    Timeout {
        /// The provider that timed out.
        provider: String,
        /// The deadline that elapsed.
        after: Duration,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// No provider is configured for the request.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true if the error means the provider has nothing for the request,
    /// as opposed to a transport or parsing failure.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_) | Self::DataNotAvailable { .. })
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(DataError::SymbolNotFound("^FCHI".into()).is_unavailable());
        assert!(
            DataError::DataNotAvailable {
                symbol: "^FCHI".into(),
                start: "2024-01-01".into(),
                end: "2024-01-31".into(),
            }
            .is_unavailable()
        );
        assert!(!DataError::Network("reset".into()).is_unavailable());
    }

    #[test]
    fn test_timeout_message() {
        let err = DataError::Timeout {
            provider: "Yahoo Finance".into(),
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "Request to Yahoo Finance timed out after 5s");
    }
}
