//! Price provider registry with fallback, caching and fetch deadlines.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use mandate_core::{DataCache, DataError, PriceDataProvider, PriceQuery, PriceSeries, Result};

/// Registry for managing price providers with automatic fallback.
///
/// Providers are tried in registration order until one succeeds. When a
/// cache is configured it is checked first and filled on success. When a
/// timeout is configured, each provider call is bounded by it.
///
/// # Example
///
/// ```rust,ignore
/// use mandate::{PriceProviderRegistry, PriceQuery, Symbol, DataFrequency};
/// use chrono::NaiveDate;
///
/// let registry = PriceProviderRegistry::new().with_yahoo();
///
/// let query = PriceQuery::new(
///     Symbol::new("^FCHI"),
///     NaiveDate::from_ymd_opt(2017, 5, 14).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
///     DataFrequency::Monthly,
/// );
/// let prices = registry.fetch_prices(&query).await?;
/// ```
#[derive(Default)]
pub struct PriceProviderRegistry {
    price_providers: Vec<Arc<dyn PriceDataProvider>>,
    cache: Option<Arc<dyn DataCache>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for PriceProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceProviderRegistry")
            .field(
                "price_providers",
                &self
                    .price_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PriceProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new registry with a cache.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn DataCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Default::default()
        }
    }

    /// Set the cache for this registry.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn DataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Bound every provider call by `timeout`.
    #[must_use]
    pub const fn set_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured cache, if any.
    #[must_use]
    pub fn cache(&self) -> Option<&Arc<dyn DataCache>> {
        self.cache.as_ref()
    }

    /// Returns the number of registered providers.
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.price_providers.len()
    }

    /// Register a price data provider.
    pub fn register_price(&mut self, provider: Arc<dyn PriceDataProvider>) {
        debug!(provider = provider.name(), "Registering price provider");
        self.price_providers.push(provider);
    }

    /// Fetch a price series, trying providers in order until one succeeds.
    ///
    /// If a cache is configured, it will be checked first and results will
    /// be cached on success.
    pub async fn fetch_prices(&self, query: &PriceQuery) -> Result<PriceSeries> {
        if self.price_providers.is_empty() {
            return Err(DataError::ProviderNotConfigured(
                "No price providers registered".to_string(),
            ));
        }

        // Check cache first
        if let Some(cache) = &self.cache {
            // Try each provider's cache key
            for provider in &self.price_providers {
                if let Ok(Some(cached)) = cache.get_prices(provider.name(), query).await {
                    debug!(
                        provider = provider.name(),
                        symbol = %query.symbol,
                        "Cache hit for price data"
                    );
                    return Ok(cached);
                }
            }
        }

        // Try each provider in order
        let mut last_error = None;
        for provider in &self.price_providers {
            debug!(
                provider = provider.name(),
                symbol = %query.symbol,
                start = %query.start,
                end = %query.end,
                frequency = %query.frequency,
                "Fetching price data"
            );

            match self.fetch_from(provider.as_ref(), query).await {
                Ok(data) => {
                    // Cache the result
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache.put_prices(provider.name(), query, &data).await {
                            warn!(
                                provider = provider.name(),
                                error = %e,
                                "Failed to cache price data"
                            );
                        }
                    }
                    return Ok(data);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DataError::Other("All providers failed with no error".to_string())))
    }

    async fn fetch_from(
        &self,
        provider: &dyn PriceDataProvider,
        query: &PriceQuery,
    ) -> Result<PriceSeries> {
        match self.timeout {
            Some(after) => tokio::time::timeout(after, provider.fetch_prices(query))
                .await
                .map_err(|_| DataError::Timeout {
                    provider: provider.name().to_string(),
                    after,
                })?,
            None => provider.fetch_prices(query).await,
        }
    }

    // Builder methods for easy setup with specific providers

    /// Add the Yahoo Finance provider.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo(mut self) -> Self {
        self.register_price(Arc::new(mandate_yahoo::YahooProvider::new()));
        self
    }
}
