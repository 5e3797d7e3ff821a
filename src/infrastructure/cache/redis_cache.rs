//! Redis-backed cache implementation.

use super::service::{
    CLICK_COUNTER_TTL_SECONDS, CacheError, CacheResult, CacheService, clicks_key, url_key,
};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::OperationError(e.to_string())
    }
}

/// Redis cache implementation.
///
/// Uses `ConnectionManager` for a shared, automatically reconnecting connection.
/// Errors are returned to the caller, which degrades to store-only behavior.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - TTL applied to URL snapshots when [`CacheService::set_url`]
    ///   is called with `ttl_seconds = None`; controlled via `CACHE_TTL` env var
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
        })
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<UrlRecord>> {
        let mut conn = self.client.clone();

        let Some(raw) = conn.get::<_, Option<String>>(url_key(short_code)).await? else {
            debug!("Cache MISS: {}", short_code);
            return Ok(None);
        };

        debug!("Cache HIT: {}", short_code);
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::SerializationError(e.to_string()))
    }

    async fn set_url(&self, record: &UrlRecord, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let ttl_seconds = ttl_seconds.unwrap_or(self.default_ttl);
        let payload = serde_json::to_string(record)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        let mut conn = self.client.clone();
        conn.set_ex::<_, _, ()>(url_key(&record.short_code), payload, ttl_seconds)
            .await?;

        debug!(
            "Cache SET: {} -> {} (TTL: {}s)",
            record.short_code, record.long_url, ttl_seconds
        );
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();
        let deleted = conn
            .del::<_, i64>(vec![url_key(short_code), clicks_key(short_code)])
            .await?;

        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", short_code);
        }
        Ok(())
    }

    async fn incr_clicks(&self, short_code: &str) -> CacheResult<i64> {
        let key = clicks_key(short_code);
        let mut conn = self.client.clone();

        let (count, _): (i64, i64) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, CLICK_COUNTER_TTL_SECONDS as i64)
            .query_async(&mut conn)
            .await?;

        Ok(count)
    }

    async fn get_clicks(&self, short_code: &str) -> CacheResult<Option<i64>> {
        self.get_counter(&clicks_key(short_code)).await
    }

    async fn get_counter(&self, key: &str) -> CacheResult<Option<i64>> {
        let mut conn = self.client.clone();
        Ok(conn.get::<_, Option<i64>>(key).await?)
    }

    async fn set_counter(&self, key: &str, value: i64, ttl_seconds: u64) -> CacheResult<()> {
        let mut conn = self.client.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn incr_counter(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.client.clone();
        Ok(conn.incr::<_, _, i64>(key, 1).await?)
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>> {
        let mut conn = self.client.clone();
        let ttl = conn.ttl::<_, i64>(key).await?;

        // -2: missing key, -1: no expiry
        Ok(u64::try_from(ttl).ok())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
