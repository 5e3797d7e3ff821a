//! Business logic services for the application layer.

pub mod cleanup_service;
pub mod rate_limiter;
pub mod url_service;

pub use cleanup_service::{CleanupReport, CleanupService};
pub use rate_limiter::{RateLimitDecision, RateLimiter};
pub use url_service::{CreatedUrl, ListedUrl, UrlPage, UrlService, UrlStats};
