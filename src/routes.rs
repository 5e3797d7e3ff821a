//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Liveness check (public)
//! - `/api/*`            - REST API (rate limited per client)
//! - `GET  /{code}`      - Short URL redirect (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client fixed window on `/api/*`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Whether the rate limiter trusts proxy headers is taken from
/// [`AppState::behind_proxy`].
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}

/// The routes and per-route middleware, without path normalization.
pub fn build_router(state: AppState) -> Router {
    let api_router = api::routes::api_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit::layer,
    ));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(tracing::layer())
}
