//! URL record entity representing a short code to long URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored short URL.
///
/// The same shape is serialized (camelCase JSON) as the cache snapshot under
/// `url:<shortCode>`. A snapshot is non-authoritative: its `clicks` may lag the
/// store, and it is subject to the same expiry check as a store row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub id: i64,
    pub long_url: String,
    pub short_code: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        id: i64,
        long_url: String,
        short_code: String,
        clicks: i64,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            long_url,
            short_code,
            clicks,
            created_at,
            expires_at,
        }
    }

    /// Returns true if `expires_at` is set and strictly before `now`.
    ///
    /// Records without `expires_at` never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

/// Input data for inserting a new record. The store assigns `id`, `clicks`
/// and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUrlRecord {
    pub long_url: String,
    pub short_code: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: Option<DateTime<Utc>>) -> UrlRecord {
        UrlRecord::new(
            1,
            "https://example.com".to_string(),
            "abc123".to_string(),
            0,
            Utc::now(),
            expires_at,
        )
    }

    #[test]
    fn test_record_without_expiry_never_expires() {
        let far_future = Utc::now() + Duration::days(365 * 100);
        assert!(!record(None).is_expired_at(far_future));
    }

    #[test]
    fn test_record_expired_after_deadline() {
        let now = Utc::now();
        let rec = record(Some(now + Duration::seconds(1)));

        assert!(!rec.is_expired_at(now));
        assert!(rec.is_expired_at(now + Duration::seconds(2)));
    }

    #[test]
    fn test_record_not_expired_exactly_at_deadline() {
        let deadline = Utc::now();
        assert!(!record(Some(deadline)).is_expired_at(deadline));
    }

    #[test]
    fn test_snapshot_json_uses_camel_case() {
        let json = serde_json::to_value(record(None)).unwrap();

        assert_eq!(json["shortCode"], "abc123");
        assert_eq!(json["longUrl"], "https://example.com");
        assert_eq!(json["clicks"], 0);
        assert!(json["expiresAt"].is_null());

        let back: UrlRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.short_code, "abc123");
    }
}
