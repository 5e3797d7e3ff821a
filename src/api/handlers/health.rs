//! Handlers for health check endpoints.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::api::dto::health::{ClickQueueStatus, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// Liveness check. Does not touch the store or the cache.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.started_at.elapsed().as_secs(),
    })
}

/// Returns service health with backing service checks.
///
/// # Endpoint
///
/// `GET /api/health/detailed`
///
/// # Response Codes
///
/// - **200 OK**: store reachable and cache healthy or disabled
/// - **503 Service Unavailable**: store unreachable or enabled cache failing
///
/// # Response
///
/// ```json
/// {
///   "status": "OK",
///   "timestamp": "2025-01-01T00:00:00Z",
///   "version": "0.1.0",
///   "uptime": 3600,
///   "database": "connected",
///   "cache": "connected",
///   "clickQueue": { "open": true, "availableCapacity": 10000 }
/// }
/// ```
pub async fn detailed_health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let database_ok = match state.repository.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Health check: database unreachable: {}", e);
            false
        }
    };

    let (cache, cache_ok) = if !state.cache.is_enabled() {
        ("disabled", true)
    } else if state.cache.health_check().await {
        ("connected", true)
    } else {
        tracing::warn!("Health check: cache unreachable");
        ("disconnected", false)
    };

    let healthy = database_ok && cache_ok;

    let response = DetailedHealthResponse {
        status: if healthy { "OK" } else { "DEGRADED" }.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.started_at.elapsed().as_secs(),
        database: if database_ok {
            "connected"
        } else {
            "disconnected"
        }
        .to_string(),
        cache: cache.to_string(),
        click_queue: ClickQueueStatus {
            open: !state.click_sender.is_closed(),
            available_capacity: state.click_sender.capacity(),
        },
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
