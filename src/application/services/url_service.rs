//! Short URL creation, resolution and click accounting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::clock::Clock;
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_code, validate_custom_code};
use crate::utils::url_validator::validate_long_url;

/// Attempts at finding a free random code before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 10;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A newly created record together with its public short URL.
#[derive(Debug, Clone)]
pub struct CreatedUrl {
    pub record: UrlRecord,
    pub short_url: String,
}

/// Store-only view of a record used by the statistics endpoint.
#[derive(Debug, Clone)]
pub struct UrlStats {
    pub record: UrlRecord,
    pub is_expired: bool,
}

/// A listed record with its derived fields.
#[derive(Debug, Clone)]
pub struct ListedUrl {
    pub record: UrlRecord,
    pub short_url: String,
    pub is_expired: bool,
}

/// One page of records with the effective pagination parameters.
#[derive(Debug, Clone)]
pub struct UrlPage {
    pub urls: Vec<ListedUrl>,
    pub limit: i64,
    pub offset: i64,
}

/// Service for creating and resolving short URLs.
///
/// Reads go through the cache first (cache-aside) and fall back to the durable
/// store. The cache is best-effort: its failures are logged and counted, never
/// returned. Clicks are counted in the cache synchronously and handed to the
/// click worker for the durable counter.
pub struct UrlService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    clicks: mpsc::Sender<ClickEvent>,
    clock: Arc<dyn Clock>,
    base_url: String,
    cache_ttl: u64,
}

impl<R: UrlRepository + ?Sized> UrlService<R> {
    /// Creates a new URL service.
    ///
    /// `base_url` prefixes every short URL (a trailing `/` is trimmed) and
    /// `cache_ttl` is the snapshot TTL in seconds.
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn CacheService>,
        clicks: mpsc::Sender<ClickEvent>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
        cache_ttl: u64,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            repository,
            cache,
            clicks,
            clock,
            base_url,
            cache_ttl,
        }
    }

    /// Creates a short URL.
    ///
    /// # Code Selection
    ///
    /// - With `custom_code`: the code is validated and must not exist yet
    /// - Otherwise: random 6-character codes are drawn until a free one is inserted,
    ///   at most 10 times
    ///
    /// The store's unique constraint is authoritative: an insert conflict after a
    /// passed existence check is reported as [`AppError::CustomCodeTaken`] for custom
    /// codes and retried for random ones.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if `long_url` is not an absolute http(s) URL
    /// - [`AppError::Validation`] for a malformed or reserved custom code, or an
    ///   `expires_at` that is not in the future
    /// - [`AppError::CustomCodeTaken`] if the custom code is in use
    /// - [`AppError::Internal`] if no free random code was found
    pub async fn create_short_url(
        &self,
        long_url: String,
        custom_code: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<CreatedUrl, AppError> {
        validate_long_url(&long_url)?;

        if expires_at.is_some_and(|at| at <= self.clock.now()) {
            return Err(AppError::validation(
                "Validation Error",
                vec!["Expiration date must be in the future".to_string()],
            ));
        }

        let record = match custom_code {
            Some(code) => self.insert_custom(long_url, code, expires_at).await?,
            None => self.insert_generated(long_url, expires_at).await?,
        };

        self.cache_snapshot(&record).await;

        info!(
            "Created short URL {} -> {}",
            record.short_code, record.long_url
        );

        Ok(CreatedUrl {
            short_url: self.short_url(&record.short_code),
            record,
        })
    }

    /// Resolves a short code to its record.
    ///
    /// Every resolution checks expiry, whether the record came from the cache or
    /// the store. The first resolution after expiry deletes the record and its
    /// cache entries; later ones report [`AppError::NotFound`].
    ///
    /// Does not count a click; see [`Self::record_click`].
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is unknown
    /// - [`AppError::Expired`] if the record has expired
    /// - store errors from the fallback lookup
    pub async fn resolve(&self, short_code: &str) -> Result<UrlRecord, AppError> {
        let (record, from_cache) = match self.cache.get_url(short_code).await {
            Ok(Some(record)) => {
                metrics::counter!("cache_hits_total").increment(1);
                (record, true)
            }
            Ok(None) => {
                metrics::counter!("cache_misses_total").increment(1);
                (self.load_and_cache(short_code).await?, false)
            }
            Err(e) => {
                warn!("Cache read failed for {}, using store: {}", short_code, e);
                metrics::counter!("cache_errors_total").increment(1);
                (self.load_and_cache(short_code).await?, false)
            }
        };

        let now = self.clock.now();
        if !record.is_expired_at(now) {
            return Ok(record);
        }

        let expired = AppError::Expired {
            short_code: short_code.to_string(),
        };

        if self.expire(&record, now).await || !from_cache {
            self.invalidate(short_code).await;
            return Err(expired);
        }

        // The expired snapshot may shadow a live record that reuses the code.
        match self.find_in_store(short_code).await {
            Ok(fresh) if !fresh.is_expired_at(now) => {
                debug!("Replacing stale cache entry for {}", short_code);
                self.invalidate(short_code).await;
                self.cache_snapshot(&fresh).await;
                Ok(fresh)
            }
            Ok(fresh) => {
                self.expire(&fresh, now).await;
                self.invalidate(short_code).await;
                Err(expired)
            }
            Err(AppError::NotFound { .. }) => {
                self.invalidate(short_code).await;
                Err(expired)
            }
            Err(e) => {
                warn!("Failed to recheck expired URL {}: {}", short_code, e);
                Err(expired)
            }
        }
    }

    /// Counts one click. Never fails.
    ///
    /// The cache counter is incremented immediately; the durable increment is
    /// queued for the click worker and dropped if the queue is full.
    pub async fn record_click(&self, short_code: &str) {
        if let Err(e) = self.cache.incr_clicks(short_code).await {
            warn!("Failed to count click in cache for {}: {}", short_code, e);
            metrics::counter!("cache_errors_total").increment(1);
        }

        let event = ClickEvent::new(short_code, self.clock.now());
        match self.clicks.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!("Click queue full, dropping click for {}", event.short_code);
                metrics::counter!("clicks_dropped_total").increment(1);
            }
            Err(TrySendError::Closed(event)) => {
                warn!("Click queue closed, dropping click for {}", event.short_code);
                metrics::counter!("clicks_dropped_total").increment(1);
            }
        }
    }

    /// Reads a record from the store for statistics.
    ///
    /// Bypasses the cache and never deletes: an expired record is reported with
    /// `is_expired = true`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn get_stats(&self, short_code: &str) -> Result<UrlStats, AppError> {
        let record = self.find_in_store(short_code).await?;
        let is_expired = record.is_expired_at(self.clock.now());

        Ok(UrlStats { record, is_expired })
    }

    /// Lists records newest first.
    ///
    /// `limit` defaults to 50 and is clamped to `1..=100`; `offset` defaults to 0.
    pub async fn list_urls(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<UrlPage, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        let offset = offset.unwrap_or(0).max(0);

        let now = self.clock.now();
        let urls = self
            .repository
            .list(limit, offset)
            .await?
            .into_iter()
            .map(|record| ListedUrl {
                short_url: self.short_url(&record.short_code),
                is_expired: record.is_expired_at(now),
                record,
            })
            .collect();

        Ok(UrlPage {
            urls,
            limit,
            offset,
        })
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url, short_code)
    }

    async fn insert_custom(
        &self,
        long_url: String,
        short_code: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<UrlRecord, AppError> {
        validate_custom_code(&short_code)?;

        if self.repository.exists(&short_code).await? {
            return Err(AppError::CustomCodeTaken { short_code });
        }

        self.repository
            .insert(NewUrlRecord {
                long_url,
                short_code,
                expires_at,
            })
            .await
    }

    /// Inserts under a random code, retrying on collisions.
    ///
    /// Gives up with [`AppError::Internal`] after [`MAX_GENERATION_ATTEMPTS`]
    /// collisions, counting both existence hits and lost insert races. With
    /// 62^6 codes a run of ten collisions means the store is misbehaving, so
    /// the request fails instead of retrying forever.
    async fn insert_generated(
        &self,
        long_url: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<UrlRecord, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let short_code = generate_code(DEFAULT_CODE_LENGTH);

            if self.repository.exists(&short_code).await? {
                debug!("Generated code {} exists (attempt {})", short_code, attempt);
                continue;
            }

            let new_record = NewUrlRecord {
                long_url: long_url.clone(),
                short_code,
                expires_at,
            };

            match self.repository.insert(new_record).await {
                Ok(record) => return Ok(record),
                Err(AppError::CustomCodeTaken { short_code }) => {
                    debug!("Generated code {} lost insert race (attempt {})", short_code, attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(format!(
            "Failed to generate unique code after {} attempts",
            MAX_GENERATION_ATTEMPTS
        )))
    }

    async fn find_in_store(&self, short_code: &str) -> Result<UrlRecord, AppError> {
        self.repository
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| AppError::NotFound {
                short_code: short_code.to_string(),
            })
    }

    async fn load_and_cache(&self, short_code: &str) -> Result<UrlRecord, AppError> {
        let record = self.find_in_store(short_code).await?;
        self.cache_snapshot(&record).await;
        Ok(record)
    }

    async fn cache_snapshot(&self, record: &UrlRecord) {
        if let Err(e) = self.cache.set_url(record, Some(self.cache_ttl)).await {
            warn!("Failed to cache {}: {}", record.short_code, e);
            metrics::counter!("cache_errors_total").increment(1);
        }
    }

    /// Deletes `record` from the store if it is still the expired owner of
    /// its code. Returns whether a row was removed.
    ///
    /// A failed store delete is left to the sweeper.
    async fn expire(&self, record: &UrlRecord, now: DateTime<Utc>) -> bool {
        let short_code = record.short_code.as_str();
        match self.repository.delete_expired_by_code(short_code, now).await {
            Ok(true) => {
                info!("Deleted expired URL {}", short_code);
                metrics::counter!("urls_expired_total").increment(1);
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!("Failed to delete expired URL {}: {}", short_code, e);
                false
            }
        }
    }

    async fn invalidate(&self, short_code: &str) {
        if let Err(e) = self.cache.invalidate(short_code).await {
            warn!("Failed to invalidate cache for {}: {}", short_code, e);
            metrics::counter!("cache_errors_total").increment(1);
        }
    }
}
