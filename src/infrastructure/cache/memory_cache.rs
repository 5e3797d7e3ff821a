//! In-process cache implementation with per-key expiry.

use std::collections::HashMap;
use std::time::Duration;

use super::service::{
    CLICK_COUNTER_TTL_SECONDS, CacheError, CacheResult, CacheService, clicks_key, url_key,
};
use crate::domain::entities::UrlRecord;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Number of stored keys above which expired entries are purged on write.
const PURGE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Single-node cache keeping entries in a process-local map.
///
/// Follows the same key namespace and TTL semantics as [`super::RedisCache`], so it
/// can stand in for Redis on a single instance or in tests. Expired keys are
/// treated as absent and removed lazily.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
    default_ttl: u64,
}

impl MemoryCache {
    /// Creates an empty cache with the default URL snapshot TTL in seconds.
    pub fn new(default_ttl_seconds: u64) -> Self {
        debug!("Using MemoryCache (in-process)");
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl: default_ttl_seconds,
        }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if `key` is present and not expired.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.read(key).await.is_some()
    }

    async fn read(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get(key).map(|e| (e.is_live(now), e.value.clone())) {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn write(&self, key: &str, value: String, ttl_seconds: Option<u64>) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        if entries.len() >= PURGE_THRESHOLD {
            entries.retain(|_, e| e.is_live(now));
        }

        entries.insert(
            key.to_string(),
            MemoryEntry {
                value,
                expires_at: ttl_seconds.map(|s| now + Duration::from_secs(s)),
            },
        );
    }

    /// Adds one to a counter. A missing or expired key starts from zero without a TTL.
    /// With `reset_ttl`, the key's lifetime is set to that many seconds afterwards.
    async fn increment(&self, key: &str, reset_ttl: Option<u64>) -> CacheResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let entry = entries
            .entry(key.to_string())
            .and_modify(|e| {
                if !e.is_live(now) {
                    e.value = "0".to_string();
                    e.expires_at = None;
                }
            })
            .or_insert_with(|| MemoryEntry {
                value: "0".to_string(),
                expires_at: None,
            });

        let current: i64 = entry.value.parse().map_err(|_| {
            CacheError::OperationError(format!("value at '{}' is not an integer", key))
        })?;
        let next = current + 1;
        entry.value = next.to_string();

        if let Some(ttl) = reset_ttl {
            entry.expires_at = Some(now + Duration::from_secs(ttl));
        }

        Ok(next)
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<UrlRecord>> {
        match self.read(&url_key(short_code)).await {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| CacheError::SerializationError(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set_url(&self, record: &UrlRecord, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let payload = serde_json::to_string(record)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        self.write(
            &url_key(&record.short_code),
            payload,
            Some(ttl_seconds.unwrap_or(self.default_ttl)),
        )
        .await;
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(&url_key(short_code));
        entries.remove(&clicks_key(short_code));
        Ok(())
    }

    async fn incr_clicks(&self, short_code: &str) -> CacheResult<i64> {
        self.increment(&clicks_key(short_code), Some(CLICK_COUNTER_TTL_SECONDS))
            .await
    }

    async fn get_clicks(&self, short_code: &str) -> CacheResult<Option<i64>> {
        self.get_counter(&clicks_key(short_code)).await
    }

    async fn get_counter(&self, key: &str) -> CacheResult<Option<i64>> {
        match self.read(key).await {
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                CacheError::OperationError(format!("value at '{}' is not an integer", key))
            }),
            None => Ok(None),
        }
    }

    async fn set_counter(&self, key: &str, value: i64, ttl_seconds: u64) -> CacheResult<()> {
        self.write(key, value.to_string(), Some(ttl_seconds)).await;
        Ok(())
    }

    async fn incr_counter(&self, key: &str) -> CacheResult<i64> {
        self.increment(key, None).await
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>> {
        let now = Instant::now();
        let entries = self.entries.lock().await;

        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now).as_secs_f64().ceil() as u64))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
