//! DTO for per-URL statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::UrlStats;

/// Statistics for a single short URL, read from the store.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub short_code: String,
    pub long_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
}

impl From<UrlStats> for StatsData {
    fn from(stats: UrlStats) -> Self {
        let record = stats.record;
        Self {
            short_code: record.short_code,
            long_url: record.long_url,
            clicks: record.clicks,
            created_at: record.created_at,
            expires_at: record.expires_at,
            is_expired: stats.is_expired,
        }
    }
}
