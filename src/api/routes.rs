//! API route configuration.
//!
//! Every API route is rate limited per client by
//! [`crate::api::middleware::rate_limit`].

use crate::api::handlers::{
    detailed_health_handler, list_urls_handler, shorten_handler, stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`          - Create a short URL
/// - `GET  /stats/{code}`     - Statistics for a short URL
/// - `GET  /urls`             - List short URLs (paginated)
/// - `GET  /health/detailed`  - Store and cache health
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/stats/{code}", get(stats_handler))
        .route("/urls", get(list_urls_handler))
        .route("/health/detailed", get(detailed_health_handler))
}
