//! Repository trait for URL record data access.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters reported by the expiration maintenance tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupStats {
    pub total_urls: i64,
    pub urls_with_expiry: i64,
    pub expired_urls: i64,
}

/// Repository interface for the durable URL store.
///
/// The store is the source of truth: short code uniqueness is enforced here,
/// and `clicks` in the store is the authoritative counter.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CustomCodeTaken`] if the short code violates the unique
    /// constraint, even when an earlier existence check reported it as free.
    ///
    /// Returns [`AppError::Internal`] or [`AppError::ServiceUnavailable`] on database errors.
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError>;

    /// Finds a record by short code.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Returns true if a record with this short code exists.
    async fn exists(&self, short_code: &str) -> Result<bool, AppError>;

    /// Deletes the record owning `short_code` only if it expired before `now`.
    ///
    /// Returns `Ok(false)` when no row matched: the code is free or now belongs
    /// to a record that is still live.
    async fn delete_expired_by_code(
        &self,
        short_code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Adds `by` to the stored click counter of a record.
    ///
    /// Returns `Ok(false)` if no record matched (e.g. it was swept meanwhile).
    async fn increment_clicks(&self, short_code: &str, by: i64) -> Result<bool, AppError>;

    /// Lists records newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError>;

    /// Deletes every record with `expires_at < now` in one statement and returns
    /// the short codes that were removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError>;

    /// Returns maintenance counters relative to `now`.
    async fn cleanup_stats(&self, now: DateTime<Utc>) -> Result<CleanupStats, AppError>;

    /// Checks store connectivity.
    async fn ping(&self) -> Result<(), AppError>;
}
