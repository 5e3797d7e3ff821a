//! Caching layer for cache-aside lookups, click counters and rate-limit windows.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - In-process cache for single-node deployments and tests
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! The cache is never required for correctness: every service absorbs cache
//! errors and falls back to the durable store.

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{
    CLICK_COUNTER_TTL_SECONDS, CacheError, CacheResult, CacheService, clicks_key,
    rate_limit_key, url_key,
};
