//! Handler for the shortening endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use validator::Validate;

use crate::api::dto::response::ApiResponse;
use crate::api::dto::shorten::{ShortenRequest, ShortenedUrl};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "longUrl": "https://example.com/some/page",
///   "customCode": "promo1",
///   "expiresAt": "2030-01-01T00:00:00Z"
/// }
/// ```
///
/// `customCode` and `expiresAt` are optional.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "success": true,
///   "message": "URL shortened successfully",
///   "data": {
///     "id": 1,
///     "longUrl": "https://example.com/some/page",
///     "shortCode": "promo1",
///     "shortUrl": "http://localhost:3000/promo1",
///     "clicks": 0,
///     "createdAt": "2025-01-01T00:00:00Z",
///     "expiresAt": "2030-01-01T00:00:00Z"
///   }
/// }
/// ```
///
/// # Errors
///
/// - 400 for malformed JSON, an invalid URL, a malformed or reserved custom code,
///   or an expiry in the past
/// - 409 if the custom code is already in use
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ShortenedUrl>>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let created = state
        .url_service
        .create_short_url(payload.long_url, payload.custom_code, payload.expires_at)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("URL shortened successfully", created.into())),
    ))
}
