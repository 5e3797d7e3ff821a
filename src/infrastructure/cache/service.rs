//! Cache service trait, key namespace and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::UrlRecord;

/// Lifetime of a cache click counter, in seconds (24h).
pub const CLICK_COUNTER_TTL_SECONDS: u64 = 86_400;

/// Errors that can occur during cache operations.
///
/// These never become [`crate::error::AppError`]s: every caller treats a failed
/// cache operation as a miss or a no-op.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
    #[error("Cache serialization error: {0}")]
    SerializationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key of the URL snapshot for a short code.
pub fn url_key(short_code: &str) -> String {
    format!("url:{}", short_code)
}

/// Key of the click counter for a short code.
pub fn clicks_key(short_code: &str) -> String {
    format!("clicks:{}", short_code)
}

/// Key of the rate-limit window for a client.
pub fn rate_limit_key(client_id: &str) -> String {
    format!("rate_limit:{}", client_id)
}

/// Ephemeral key-value store with TTLs.
///
/// Used for cache-aside URL snapshots, the fast click counter, and rate-limit
/// windows. Implementations report failures as [`CacheError`]; the services decide
/// how to degrade (miss, no-op, or fail-open).
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process cache
/// - [`crate::infrastructure::cache::NullCache`] - Caching disabled
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns false when the cache is disabled.
    ///
    /// Callers skip cache-only features (e.g. rate limiting) instead of treating
    /// every operation as a miss.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Reads the URL snapshot stored under `url:<short_code>`.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<UrlRecord>>;

    /// Stores a URL snapshot. `ttl_seconds = None` uses the backend default.
    async fn set_url(&self, record: &UrlRecord, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Removes the URL snapshot and the click counter of a short code.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Increments `clicks:<short_code>` and (re)sets its TTL to
    /// [`CLICK_COUNTER_TTL_SECONDS`]. Returns the new value.
    async fn incr_clicks(&self, short_code: &str) -> CacheResult<i64>;

    /// Reads the click counter of a short code.
    async fn get_clicks(&self, short_code: &str) -> CacheResult<Option<i64>>;

    /// Reads an integer counter.
    async fn get_counter(&self, key: &str) -> CacheResult<Option<i64>>;

    /// Sets an integer counter with a TTL.
    async fn set_counter(&self, key: &str, value: i64, ttl_seconds: u64) -> CacheResult<()>;

    /// Increments an integer counter, keeping its TTL. Returns the new value.
    async fn incr_counter(&self, key: &str) -> CacheResult<i64>;

    /// Remaining lifetime of a key in seconds, `None` if missing or persistent.
    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
