//! Cache trait for storing fetched price series.
//!
//! This module defines the [`DataCache`] trait that provides a unified interface
//! for caching price series between analysis passes.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::Result,
    types::{PriceQuery, PriceSeries},
};

/// Trait for caching fetched price data.
///
/// Entries are keyed by provider name and the full [`PriceQuery`]. Only raw
/// prices are cached; derived statistics are always recomputed.
#[async_trait]
pub trait DataCache: Send + Sync {
    /// Retrieves a cached price series.
    ///
    /// Returns `Ok(Some(series))` if cached data exists, `Ok(None)` if not cached.
    async fn get_prices(&self, provider: &str, query: &PriceQuery) -> Result<Option<PriceSeries>>;

    /// Stores a price series in the cache.
    async fn put_prices(&self, provider: &str, query: &PriceQuery, series: &PriceSeries)
    -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
