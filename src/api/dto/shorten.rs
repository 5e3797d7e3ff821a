//! DTOs for the shortening endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::application::services::CreatedUrl;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// Request to shorten a URL.
///
/// Reserved keywords and the http(s) scheme are checked by the service.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The original URL to shorten.
    #[validate(
        length(max = 2048, message = "URL cannot be longer than 2048 characters"),
        url(message = "Please provide a valid URL starting with http:// or https://")
    )]
    pub long_url: String,

    #[validate(
        length(
            min = 3,
            max = 10,
            message = "Custom code must be between 3 and 10 characters long"
        ),
        regex(
            path = *CUSTOM_CODE_REGEX,
            message = "Custom code can only contain letters and numbers"
        )
    )]
    pub custom_code: Option<String>,

    /// Optional expiry timestamp (RFC 3339). After this time the link returns 410 Gone.
    pub expires_at: Option<DateTime<Utc>>,
}

/// A created short URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenedUrl {
    pub id: i64,
    pub long_url: String,
    pub short_code: String,
    pub short_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<CreatedUrl> for ShortenedUrl {
    fn from(created: CreatedUrl) -> Self {
        let record = created.record;
        Self {
            id: record.id,
            long_url: record.long_url,
            short_code: record.short_code,
            short_url: created.short_url,
            clicks: record.clicks,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}
