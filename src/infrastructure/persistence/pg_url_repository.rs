//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{CleanupStats, UrlRepository};
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_code;

const URL_COLUMNS: &str = "id, long_url, short_code, clicks, created_at, expires_at";

#[derive(Debug, FromRow)]
struct UrlRow {
    id: i64,
    long_url: String,
    short_code: String,
    clicks: i32,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord::new(
            row.id,
            row.long_url,
            row.short_code,
            i64::from(row.clicks),
            row.created_at,
            row.expires_at,
        )
    }
}

#[derive(Debug, FromRow)]
struct CleanupStatsRow {
    total_urls: i64,
    urls_with_expiry: i64,
    expired_urls: i64,
}

/// Table statistics reported after `ANALYZE`.
#[derive(Debug, Clone, FromRow)]
pub struct TableStats {
    pub inserts: i64,
    pub updates: i64,
    pub deletes: i64,
    pub live_tuples: i64,
    pub dead_tuples: i64,
}

/// PostgreSQL repository for URL records.
///
/// Uses bound parameters for every value. The unique constraint
/// `urls_short_code_key` is the final arbiter of short code ownership.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Refreshes planner statistics for the `urls` table and returns its tuple counters.
    ///
    /// Returns `Ok(None)` if the statistics collector has no row for the table yet.
    pub async fn analyze(&self) -> Result<Option<TableStats>, AppError> {
        sqlx::query("ANALYZE urls")
            .execute(self.pool.as_ref())
            .await?;

        let stats = sqlx::query_as::<_, TableStats>(
            r#"
            SELECT
                n_tup_ins AS inserts,
                n_tup_upd AS updates,
                n_tup_del AS deletes,
                n_live_tup AS live_tuples,
                n_dead_tup AS dead_tuples
            FROM pg_stat_user_tables
            WHERE relname = 'urls'
            "#,
        )
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(stats)
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let result = sqlx::query_as::<_, UrlRow>(&format!(
            r#"
            INSERT INTO urls (long_url, short_code, expires_at)
            VALUES ($1, $2, $3)
            RETURNING {URL_COLUMNS}
            "#
        ))
        .bind(&new_record.long_url)
        .bind(&new_record.short_code)
        .bind(new_record.expires_at)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e) if is_unique_violation_on_code(&e) => Err(AppError::CustomCodeTaken {
                short_code: new_record.short_code,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(&format!(
            "SELECT {URL_COLUMNS} FROM urls WHERE short_code = $1"
        ))
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn exists(&self, short_code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM urls WHERE short_code = $1)",
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn delete_expired_by_code(
        &self,
        short_code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM urls WHERE short_code = $1 AND expires_at < $2")
            .bind(short_code)
            .bind(now)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_clicks(&self, short_code: &str, by: i64) -> Result<bool, AppError> {
        let by = i32::try_from(by)
            .map_err(|_| AppError::internal(format!("Click increment {} out of range", by)))?;

        let result = sqlx::query("UPDATE urls SET clicks = clicks + $2 WHERE short_code = $1")
            .bind(short_code)
            .bind(by)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError> {
        let rows = sqlx::query_as::<_, UrlRow>(&format!(
            r#"
            SELECT {URL_COLUMNS}
            FROM urls
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let codes = sqlx::query_scalar::<_, String>(
            "DELETE FROM urls WHERE expires_at < $1 RETURNING short_code",
        )
        .bind(now)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(codes)
    }

    async fn cleanup_stats(&self, now: DateTime<Utc>) -> Result<CleanupStats, AppError> {
        let row = sqlx::query_as::<_, CleanupStatsRow>(
            r#"
            SELECT
                COUNT(*) AS total_urls,
                COUNT(*) FILTER (WHERE expires_at IS NOT NULL) AS urls_with_expiry,
                COUNT(*) FILTER (WHERE expires_at < $1) AS expired_urls
            FROM urls
            "#,
        )
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(CleanupStats {
            total_urls: row.total_urls,
            urls_with_expiry: row.urls_with_expiry,
            expired_urls: row.expired_urls,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
