//! DTOs for the URL listing endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::application::services::ListedUrl;

/// Listing query parameters.
///
/// Uses `serde_with` to parse numbers from query strings. Defaults and bounds
/// are applied by the service.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListUrlsQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlListItem {
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
    pub short_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
}

impl From<ListedUrl> for UrlListItem {
    fn from(listed: ListedUrl) -> Self {
        let record = listed.record;
        Self {
            id: record.id,
            short_code: record.short_code,
            long_url: record.long_url,
            short_url: listed.short_url,
            clicks: record.clicks,
            created_at: record.created_at,
            expires_at: record.expires_at,
            is_expired: listed.is_expired,
        }
    }
}

/// Effective pagination of a listing.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ListUrlsResponse {
    pub success: bool,
    pub message: String,
    pub data: Vec<UrlListItem>,
    pub pagination: PaginationMeta,
}
