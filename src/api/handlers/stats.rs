//! Handler for per-URL statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::response::ApiResponse;
use crate::api::dto::stats::StatsData;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::code_generator::validate_short_code_param;

/// Returns statistics for a short URL.
///
/// # Endpoint
///
/// `GET /api/stats/{code}`
///
/// Reads the store only: `clicks` is the durable counter and an expired record
/// is reported with `isExpired: true` instead of being deleted.
///
/// # Errors
///
/// - 400 if the code is malformed
/// - 404 if the code is unknown
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatsData>>, AppError> {
    validate_short_code_param(&code)?;

    let stats = state.url_service.get_stats(&code).await?;

    Ok(Json(ApiResponse::ok(
        "Statistics retrieved successfully",
        stats.into(),
    )))
}
