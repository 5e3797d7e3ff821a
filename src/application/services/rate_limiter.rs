//! Fixed-window request limiter backed by the cache.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::infrastructure::cache::{CacheResult, CacheService, rate_limit_key};
use crate::utils::clock::Clock;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// When the current window ends. Only set for rejected requests whose window
    /// TTL could be read.
    pub reset_time: Option<DateTime<Utc>>,
}

impl RateLimitDecision {
    fn allow(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            reset_time: None,
        }
    }

    /// Seconds until the client may retry, falling back to the window length.
    pub fn retry_after_secs(&self, now: DateTime<Utc>, window_ms: u64) -> u64 {
        match self.reset_time {
            Some(reset) => {
                let millis = (reset - now).num_milliseconds().max(0) as u64;
                millis.div_ceil(1000)
            }
            None => window_ms.div_ceil(1000),
        }
    }
}

/// Per-client fixed-window counter stored under `rate_limit:<clientId>`.
///
/// The first request of a window stores `1` with a TTL of the window length;
/// later requests increment. Once the count reaches the limit, requests are
/// rejected until the key expires.
///
/// Fails open: when the cache is disabled or errors, every request is allowed.
pub struct RateLimiter {
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
    window_ms: u64,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        window_ms: u64,
        max_requests: u32,
    ) -> Self {
        Self {
            cache,
            clock,
            window_ms,
            max_requests,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Checks a client against the configured window and limit.
    pub async fn check(&self, client_id: &str) -> RateLimitDecision {
        self.check_rate_limit(client_id, self.window_ms, self.max_requests)
            .await
    }

    /// Checks and counts one request for `client_id`.
    pub async fn check_rate_limit(
        &self,
        client_id: &str,
        window_ms: u64,
        max_requests: u32,
    ) -> RateLimitDecision {
        if !self.cache.is_enabled() {
            return RateLimitDecision::allow(max_requests);
        }

        match self.count_request(client_id, window_ms, max_requests).await {
            Ok(decision) => {
                if decision.allowed {
                    debug!(
                        "Rate limit check passed for {}, remaining: {}",
                        client_id, decision.remaining
                    );
                } else {
                    warn!("Rate limit exceeded for {}", client_id);
                    metrics::counter!("rate_limit_rejections_total").increment(1);
                }
                decision
            }
            Err(e) => {
                warn!("Rate limit check failed for {}, allowing: {}", client_id, e);
                metrics::counter!("cache_errors_total").increment(1);
                RateLimitDecision::allow(max_requests)
            }
        }
    }

    async fn count_request(
        &self,
        client_id: &str,
        window_ms: u64,
        max_requests: u32,
    ) -> CacheResult<RateLimitDecision> {
        let key = rate_limit_key(client_id);
        let window_secs = window_ms.div_ceil(1000).max(1);
        let max = i64::from(max_requests);

        let Some(count) = self.cache.get_counter(&key).await? else {
            self.cache.set_counter(&key, 1, window_secs).await?;
            return Ok(RateLimitDecision::allow(max_requests.saturating_sub(1)));
        };

        if count >= max {
            let reset_time = self
                .cache
                .ttl(&key)
                .await?
                .map(|ttl| self.clock.now() + Duration::seconds(ttl as i64));

            return Ok(RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_time,
            });
        }

        // The window lapsed between the read and the increment.
        if self.cache.incr_counter(&key).await? == 1 {
            self.cache.set_counter(&key, 1, window_secs).await?;
            return Ok(RateLimitDecision::allow(max_requests.saturating_sub(1)));
        }

        let remaining = (max - count - 1).max(0) as u32;
        Ok(RateLimitDecision::allow(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UrlRecord;
    use crate::infrastructure::cache::{CacheError, MemoryCache, NullCache};
    use crate::utils::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct BrokenCache;

    #[async_trait]
    impl CacheService for BrokenCache {
        async fn get_url(&self, _: &str) -> CacheResult<Option<UrlRecord>> {
            Ok(None)
        }
        async fn set_url(&self, _: &UrlRecord, _: Option<u64>) -> CacheResult<()> {
            Ok(())
        }
        async fn invalidate(&self, _: &str) -> CacheResult<()> {
            Ok(())
        }
        async fn incr_clicks(&self, _: &str) -> CacheResult<i64> {
            Ok(1)
        }
        async fn get_clicks(&self, _: &str) -> CacheResult<Option<i64>> {
            Ok(None)
        }
        async fn get_counter(&self, _: &str) -> CacheResult<Option<i64>> {
            Err(CacheError::OperationError("READONLY".into()))
        }
        async fn set_counter(&self, _: &str, _: i64, _: u64) -> CacheResult<()> {
            Err(CacheError::OperationError("READONLY".into()))
        }
        async fn incr_counter(&self, _: &str) -> CacheResult<i64> {
            Err(CacheError::OperationError("READONLY".into()))
        }
        async fn ttl(&self, _: &str) -> CacheResult<Option<u64>> {
            Err(CacheError::OperationError("READONLY".into()))
        }
        async fn health_check(&self) -> bool {
            false
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn limiter(cache: Arc<dyn CacheService>) -> RateLimiter {
        RateLimiter::new(cache, Arc::new(ManualClock::new(now())), 1000, 3)
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_allows_max_then_rejects() {
        let limiter = limiter(Arc::new(MemoryCache::new(3600)));

        let remaining: Vec<u32> = [
            limiter.check("10.0.0.1").await,
            limiter.check("10.0.0.1").await,
            limiter.check("10.0.0.1").await,
        ]
        .iter()
        .inspect(|d| assert!(d.allowed))
        .map(|d| d.remaining)
        .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let rejected = limiter.check("10.0.0.1").await;
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.reset_time, Some(now() + Duration::seconds(1)));
        assert_eq!(rejected.retry_after_secs(now(), 1000), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_ttl() {
        let limiter = limiter(Arc::new(MemoryCache::new(3600)));

        for _ in 0..4 {
            limiter.check("client").await;
        }
        assert!(!limiter.check("client").await.allowed);

        tokio::time::advance(std::time::Duration::from_millis(1001)).await;

        let decision = limiter.check("client").await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[tokio::test]
    async fn test_clients_are_counted_separately() {
        let limiter = limiter(Arc::new(MemoryCache::new(3600)));

        for _ in 0..3 {
            assert!(limiter.check("a").await.allowed);
        }
        assert!(!limiter.check("a").await.allowed);
        assert!(limiter.check("b").await.allowed);
    }

    #[tokio::test]
    async fn test_fails_open_on_cache_error() {
        let limiter = limiter(Arc::new(BrokenCache));

        for _ in 0..10 {
            let decision = limiter.check("client").await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, 3);
        }
    }

    #[tokio::test]
    async fn test_disabled_cache_allows_everything() {
        let limiter = limiter(Arc::new(NullCache::new()));

        let decision = limiter.check("client").await;
        assert_eq!(decision, RateLimitDecision::allow(3));
    }

    #[test]
    fn test_retry_after_without_reset_time_uses_window() {
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time: None,
        };

        assert_eq!(decision.retry_after_secs(now(), 60_000), 60);
        assert_eq!(decision.retry_after_secs(now(), 1500), 2);
    }
}
