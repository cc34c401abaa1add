//! No-op cache implementation.

use async_trait::async_trait;
use mandate_core::{DataCache, PriceQuery, PriceSeries, Result};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get_prices` always returns `Ok(None)` and `put_prices` returns `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataCache for NoopCache {
    async fn get_prices(&self, _provider: &str, _query: &PriceQuery) -> Result<Option<PriceSeries>> {
        trace!("NoopCache: get_prices called, returning None");
        Ok(None)
    }

    async fn put_prices(
        &self,
        _provider: &str,
        _query: &PriceQuery,
        _series: &PriceSeries,
    ) -> Result<()> {
        trace!("NoopCache: put_prices called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, nothing to invalidate");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, nothing to clear");
        Ok(())
    }
}
