//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that stores nothing.
///
/// Used when no cache backend is configured or the Redis connection fails at
/// startup. Reads always miss and writes succeed without effect, so every lookup
/// goes to the store. [`CacheService::is_enabled`] returns false.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<UrlRecord>> {
        Ok(None)
    }

    async fn set_url(&self, _record: &UrlRecord, _ttl_seconds: Option<u64>) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn incr_clicks(&self, _short_code: &str) -> CacheResult<i64> {
        Ok(0)
    }

    async fn get_clicks(&self, _short_code: &str) -> CacheResult<Option<i64>> {
        Ok(None)
    }

    async fn get_counter(&self, _key: &str) -> CacheResult<Option<i64>> {
        Ok(None)
    }

    async fn set_counter(&self, _key: &str, _value: i64, _ttl_seconds: u64) -> CacheResult<()> {
        Ok(())
    }

    async fn incr_counter(&self, _key: &str) -> CacheResult<i64> {
        Ok(0)
    }

    async fn ttl(&self, _key: &str) -> CacheResult<Option<u64>> {
        Ok(None)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
