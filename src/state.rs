//! Shared application state injected into handlers.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::application::services::{CleanupService, RateLimiter, UrlService};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::CacheService;
use crate::utils::clock::Clock;

/// Runtime settings the services and handlers need, independent of how they
/// were loaded.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub cache_ttl: u64,
    pub rate_limit_window_ms: u64,
    pub rate_limit_max_requests: u32,
    pub behind_proxy: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            cache_ttl: 3600,
            rate_limit_window_ms: 60_000,
            rate_limit_max_requests: 10,
            behind_proxy: false,
        }
    }
}

/// Cloneable handle to the services. Everything behind it is shared.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService<dyn UrlRepository>>,
    pub cleanup_service: Arc<CleanupService<dyn UrlRepository>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub repository: Arc<dyn UrlRepository>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub base_url: String,
    pub behind_proxy: bool,
    pub started_at: Instant,
}

impl AppState {
    /// Wires the services around a repository and a cache.
    ///
    /// `click_sender` feeds the click worker; the caller owns the receiving end.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: ServiceSettings,
    ) -> Self {
        let url_service = Arc::new(UrlService::new(
            repository.clone(),
            cache.clone(),
            click_sender.clone(),
            clock.clone(),
            settings.base_url.clone(),
            settings.cache_ttl,
        ));

        let cleanup_service = Arc::new(CleanupService::new(
            repository.clone(),
            cache.clone(),
            clock.clone(),
        ));

        let rate_limiter = Arc::new(RateLimiter::new(
            cache.clone(),
            clock,
            settings.rate_limit_window_ms,
            settings.rate_limit_max_requests,
        ));

        Self {
            url_service,
            cleanup_service,
            rate_limiter,
            repository,
            cache,
            click_sender,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            behind_proxy: settings.behind_proxy,
            started_at: Instant::now(),
        }
    }
}
