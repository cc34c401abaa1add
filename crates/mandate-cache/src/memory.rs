//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use mandate_core::{DataCache, PriceQuery, PriceSeries, Result};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for price cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PriceKey {
    provider: String,
    query: PriceQuery,
}

impl PriceKey {
    fn new(provider: &str, query: &PriceQuery) -> Self {
        Self {
            provider: provider.to_string(),
            query: query.clone(),
        }
    }
}

/// Simple in-memory cache.
///
/// Data is stored in a `RwLock`-protected `HashMap` and is lost when the cache
/// is dropped. Series are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    prices: RwLock<HashMap<PriceKey, CacheEntry<PriceSeries>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached series.
    pub async fn len(&self) -> usize {
        self.prices.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.prices.read().await.is_empty()
    }
}

#[async_trait]
impl DataCache for InMemoryCache {
    #[instrument(skip(self, query), fields(provider = %provider, symbol = %query.symbol))]
    async fn get_prices(&self, provider: &str, query: &PriceQuery) -> Result<Option<PriceSeries>> {
        let cache = self.prices.read().await;
        match cache.get(&PriceKey::new(provider, query)) {
            Some(entry) => {
                debug!("Cache hit for price data");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for price data");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, query, series), fields(provider = %provider, symbol = %query.symbol))]
    async fn put_prices(
        &self,
        provider: &str,
        query: &PriceQuery,
        series: &PriceSeries,
    ) -> Result<()> {
        let mut cache = self.prices.write().await;
        cache.insert(PriceKey::new(provider, query), CacheEntry::new(series.clone()));
        debug!("Cached {} prices", series.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut cache = self.prices.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - cache.len();

        if removed > 0 {
            debug!("Invalidated {} stale cache entries", removed);
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.prices.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mandate_core::{DataFrequency, PriceField, Symbol};

    fn query() -> PriceQuery {
        PriceQuery::new(
            Symbol::new("^FCHI"),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            DataFrequency::Daily,
        )
    }

    fn series() -> PriceSeries {
        PriceSeries::from_prices(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), &[7400.0, 7450.0])
    }

    #[tokio::test]
    async fn test_memory_cache_prices() {
        let cache = InMemoryCache::new();

        // Initially no data
        let result = cache.get_prices("test", &query()).await.unwrap();
        assert!(result.is_none());

        cache.put_prices("test", &query(), &series()).await.unwrap();

        let result = cache.get_prices("test", &query()).await.unwrap();
        assert_eq!(result, Some(series()));

        // Other providers and other fields do not share entries
        assert!(cache.get_prices("other", &query()).await.unwrap().is_none());
        let adjusted = query().with_field(PriceField::AdjustedClose);
        assert!(cache.get_prices("test", &adjusted).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate_stale() {
        let cache = InMemoryCache::new();
        cache.put_prices("test", &query(), &series()).await.unwrap();

        // Fresh entries survive a long TTL
        assert_eq!(cache.invalidate_stale(Duration::from_secs(3600)).await.unwrap(), 0);
        assert_eq!(cache.len().await, 1);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.invalidate_stale(Duration::ZERO).await.unwrap(), 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = InMemoryCache::new();
        cache.put_prices("test", &query(), &series()).await.unwrap();

        cache.clear().await.unwrap();

        let result = cache.get_prices("test", &query()).await.unwrap();
        assert!(result.is_none());
    }
}
