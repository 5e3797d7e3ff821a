#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use swifturl::domain::click_event::ClickEvent;
use swifturl::domain::entities::{NewUrlRecord, UrlRecord};
use swifturl::domain::repositories::{CleanupStats, UrlRepository};
use swifturl::error::AppError;
use swifturl::infrastructure::cache::{CacheService, MemoryCache};
use swifturl::routes::build_router;
use swifturl::state::{AppState, ServiceSettings};
use swifturl::utils::clock::{Clock, ManualClock};
use tokio::sync::mpsc;

pub const BASE_URL: &str = "http://sho.rt";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Store fake with the same uniqueness and ordering rules as the urls table.
pub struct InMemoryUrlRepository {
    records: Mutex<HashMap<String, UrlRecord>>,
    next_id: AtomicI64,
    clock: Arc<ManualClock>,
    lookups: AtomicUsize,
}

impl InMemoryUrlRepository {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            clock,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of `find_by_code` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn get(&self, short_code: &str) -> Option<UrlRecord> {
        self.records.lock().unwrap().get(short_code).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn seed(&self, short_code: &str, long_url: &str, expires_at: Option<DateTime<Utc>>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = UrlRecord::new(
            id,
            long_url.to_string(),
            short_code.to_string(),
            0,
            self.clock.now(),
            expires_at,
        );
        self.records
            .lock()
            .unwrap()
            .insert(short_code.to_string(), record);
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&new_record.short_code) {
            return Err(AppError::CustomCodeTaken {
                short_code: new_record.short_code,
            });
        }

        let record = UrlRecord::new(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            new_record.long_url,
            new_record.short_code.clone(),
            0,
            self.clock.now(),
            new_record.expires_at,
        );
        records.insert(new_record.short_code, record.clone());
        Ok(record)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<UrlRecord>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(short_code))
    }

    async fn exists(&self, short_code: &str) -> Result<bool, AppError> {
        Ok(self.records.lock().unwrap().contains_key(short_code))
    }

    async fn delete_expired_by_code(
        &self,
        short_code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut records = self.records.lock().unwrap();
        if records.get(short_code).is_some_and(|r| r.is_expired_at(now)) {
            records.remove(short_code);
            return Ok(true);
        }
        Ok(false)
    }

    async fn increment_clicks(&self, short_code: &str, by: i64) -> Result<bool, AppError> {
        match self.records.lock().unwrap().get_mut(short_code) {
            Some(record) => {
                record.clicks += by;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError> {
        let mut records: Vec<UrlRecord> = self.records.lock().unwrap().values().cloned().collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let mut records = self.records.lock().unwrap();
        let expired: Vec<String> = records
            .values()
            .filter(|r| r.is_expired_at(now))
            .map(|r| r.short_code.clone())
            .collect();

        for code in &expired {
            records.remove(code);
        }
        Ok(expired)
    }

    async fn cleanup_stats(&self, now: DateTime<Utc>) -> Result<CleanupStats, AppError> {
        let records = self.records.lock().unwrap();
        Ok(CleanupStats {
            total_urls: records.len() as i64,
            urls_with_expiry: records.values().filter(|r| r.expires_at.is_some()).count() as i64,
            expired_urls: records.values().filter(|r| r.is_expired_at(now)).count() as i64,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// A full application over in-memory backends.
///
/// The click receiver is held, not drained, so tests can inspect queued events.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub repository: Arc<InMemoryUrlRepository>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<ManualClock>,
    pub clicks: mpsc::Receiver<ClickEvent>,
}

pub fn settings() -> ServiceSettings {
    ServiceSettings {
        base_url: BASE_URL.to_string(),
        rate_limit_max_requests: 1000,
        ..ServiceSettings::default()
    }
}

pub fn test_app() -> TestApp {
    test_app_with(settings())
}

pub fn test_app_with(settings: ServiceSettings) -> TestApp {
    let cache = Arc::new(MemoryCache::new(settings.cache_ttl));
    test_app_with_cache(settings, cache.clone(), cache)
}

/// Builds the app around an arbitrary cache backend. `memory` is kept for
/// inspection and may be unrelated to `cache`.
pub fn test_app_with_cache(
    settings: ServiceSettings,
    cache: Arc<dyn CacheService>,
    memory: Arc<MemoryCache>,
) -> TestApp {
    let clock = Arc::new(ManualClock::new(start_time()));
    let repository = Arc::new(InMemoryUrlRepository::new(clock.clone()));
    let (tx, rx) = mpsc::channel(100);

    let state = AppState::new(repository.clone(), cache, clock.clone(), tx, settings);
    let server = TestServer::new(build_router(state.clone())).unwrap();

    TestApp {
        server,
        state,
        repository,
        cache: memory,
        clock,
        clicks: rx,
    }
}
