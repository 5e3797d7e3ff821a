//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! cache access, validation, and business rules. Services consume repository
//! traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Short URL creation, resolution, clicks and stats
//! - [`services::cleanup_service::CleanupService`] - Expiration sweeper
//! - [`services::rate_limiter::RateLimiter`] - Fixed-window request limiter

pub mod services;
