//! Expiration sweeper: bulk removal of expired URLs.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::repositories::{CleanupStats, UrlRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::clock::Clock;

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupReport {
    /// Number of records deleted.
    pub cleaned: usize,
    /// Short codes of the deleted records.
    pub codes: Vec<String>,
}

/// Deletes expired records from the store and their cache entries.
///
/// Runs independently of lookups. A lookup that fetched a record just before it
/// was swept may serve it once more; the lookup's own expiry check still applies.
pub struct CleanupService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
}

impl<R: UrlRepository + ?Sized> CleanupService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            cache,
            clock,
        }
    }

    /// Deletes every record with `expires_at` before now, then clears the cache
    /// entries (snapshot and click counter) of each deleted code.
    ///
    /// # Errors
    ///
    /// Returns store errors from the bulk delete. Cache failures are logged only.
    pub async fn cleanup_expired_urls(&self) -> Result<CleanupReport, AppError> {
        let now = self.clock.now();
        let codes = self.repository.delete_expired(now).await?;

        for code in &codes {
            if let Err(e) = self.cache.invalidate(code).await {
                warn!("Failed to invalidate cache for swept URL {}: {}", code, e);
                metrics::counter!("cache_errors_total").increment(1);
            }
        }

        if codes.is_empty() {
            debug!("Cleanup: no expired URLs");
        } else {
            info!("Cleanup: removed {} expired URLs", codes.len());
            metrics::counter!("urls_expired_total").increment(codes.len() as u64);
        }

        Ok(CleanupReport {
            cleaned: codes.len(),
            codes,
        })
    }

    /// Returns record counts relevant to expiration.
    pub async fn cleanup_stats(&self) -> Result<CleanupStats, AppError> {
        self.repository.cleanup_stats(self.clock.now()).await
    }
}

impl<R: UrlRepository + ?Sized + 'static> CleanupService<R> {
    /// Spawns a background task that sweeps once per `interval`.
    ///
    /// The first sweep runs one interval after spawning. Failed sweeps are logged
    /// and retried on the next tick. Abort the returned handle to stop the task.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Starting expiration sweeper with interval of {} seconds",
                interval.as_secs()
            );

            loop {
                tokio::time::sleep(interval).await;

                if let Err(e) = self.cleanup_expired_urls().await {
                    error!("Expiration sweep failed: {}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UrlRecord;
    use crate::domain::repositories::MockUrlRepository;
    use crate::infrastructure::cache::{MemoryCache, clicks_key};
    use crate::utils::clock::ManualClock;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn service(repo: MockUrlRepository, cache: Arc<MemoryCache>) -> CleanupService<MockUrlRepository> {
        CleanupService::new(Arc::new(repo), cache, Arc::new(ManualClock::new(now())))
    }

    #[tokio::test]
    async fn test_cleanup_removes_cache_entries_of_swept_codes() {
        let cache = Arc::new(MemoryCache::new(3600));
        for code in ["old1", "old2", "live1"] {
            let record = UrlRecord::new(
                1,
                "https://example.com".to_string(),
                code.to_string(),
                0,
                now(),
                None,
            );
            cache.set_url(&record, None).await.unwrap();
            cache.incr_clicks(code).await.unwrap();
        }

        let mut repo = MockUrlRepository::new();
        repo.expect_delete_expired()
            .withf(|at| *at == now())
            .times(1)
            .returning(|_| Ok(vec!["old1".to_string(), "old2".to_string()]));

        let report = service(repo, cache.clone())
            .cleanup_expired_urls()
            .await
            .unwrap();

        assert_eq!(report.cleaned, 2);
        assert_eq!(report.codes, vec!["old1", "old2"]);
        assert!(cache.get_url("old1").await.unwrap().is_none());
        assert!(!cache.contains_key(&clicks_key("old2")).await);
        assert!(cache.get_url("live1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cleanup_with_nothing_expired() {
        let mut repo = MockUrlRepository::new();
        repo.expect_delete_expired()
            .times(1)
            .returning(|_| Ok(vec![]));

        let report = service(repo, Arc::new(MemoryCache::new(3600)))
            .cleanup_expired_urls()
            .await
            .unwrap();

        assert_eq!(report, CleanupReport::default());
    }

    #[tokio::test]
    async fn test_cleanup_propagates_store_error() {
        let mut repo = MockUrlRepository::new();
        repo.expect_delete_expired()
            .times(1)
            .returning(|_| Err(AppError::internal("boom")));

        let result = service(repo, Arc::new(MemoryCache::new(3600)))
            .cleanup_expired_urls()
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_stats_passes_clock_time() {
        let mut repo = MockUrlRepository::new();
        repo.expect_cleanup_stats()
            .withf(|at| *at == now())
            .times(1)
            .returning(|_| {
                Ok(CleanupStats {
                    total_urls: 10,
                    urls_with_expiry: 4,
                    expired_urls: 1,
                })
            });

        let stats = service(repo, Arc::new(MemoryCache::new(3600)))
            .cleanup_stats()
            .await
            .unwrap();

        assert_eq!(stats.urls_with_expiry, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_every_interval_and_survives_errors() {
        let sweeps = Arc::new(AtomicUsize::new(0));
        let sweeps_in_mock = sweeps.clone();

        let mut repo = MockUrlRepository::new();
        repo.expect_delete_expired().returning(move |_| {
            if sweeps_in_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::internal("transient"))
            } else {
                Ok(vec![])
            }
        });

        let sweeper = Arc::new(service(repo, Arc::new(MemoryCache::new(3600))));
        let handle = sweeper.spawn(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sweeps.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(sweeps.load(Ordering::SeqCst), 2);

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
