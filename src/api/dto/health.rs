//! DTOs for health check endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: u64,
}

/// Health of the backing services.
///
/// `status` is `OK` or `DEGRADED`; `database` and `cache` are `connected`,
/// `disconnected` or (cache only) `disabled`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: u64,
    pub database: String,
    pub cache: String,
    pub click_queue: ClickQueueStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickQueueStatus {
    pub open: bool,
    pub available_capacity: usize,
}
