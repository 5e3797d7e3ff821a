//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::state::AppState;
use crate::utils::code_generator::is_valid_code_format;
use crate::web::ErrorPage;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code (cache first, then store)
/// 2. Count the click (cache counter now, store counter via the click worker)
/// 3. Return `302 Found` so browsers do not cache the redirect
///
/// # Failures
///
/// Failures render an HTML page instead of JSON:
/// - 404 for unknown or malformed codes
/// - 410 for expired codes (the record is deleted on this request)
/// - 500 for store failures
pub async fn redirect_handler(Path(code): Path<String>, State(state): State<AppState>) -> Response {
    if !is_valid_code_format(&code) {
        return (StatusCode::NOT_FOUND, ErrorPage::not_found(&state.base_url)).into_response();
    }

    match state.url_service.resolve(&code).await {
        Ok(record) => {
            state.url_service.record_click(&code).await;
            info!("Redirecting {} to {}", code, record.long_url);

            (StatusCode::FOUND, [(header::LOCATION, record.long_url)]).into_response()
        }
        Err(e) => {
            if e.is_system_failure() {
                error!("Redirect for {} failed: {:?}", code, e);
            }
            ErrorPage::for_error(&e, &state.base_url).into_response()
        }
    }
}
