//! Per-client fixed-window rate limiting for the API.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::SecondsFormat;

use crate::application::services::{RateLimitDecision, RateLimiter};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_id;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_WINDOW: HeaderName = HeaderName::from_static("x-ratelimit-window");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Limits requests per client using [`RateLimiter`].
///
/// # Key Extraction
///
/// The client is identified by the socket peer address, or by `X-Forwarded-For` /
/// `X-Real-IP` when the service is configured to run behind a trusted proxy.
///
/// # Headers
///
/// Every response carries `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
/// `X-RateLimit-Window` (milliseconds). Rejections add `X-RateLimit-Reset`
/// (RFC 3339) when the window end is known, plus `Retry-After`.
///
/// Requests over the limit receive `429 Too Many Requests` with the JSON error
/// envelope and a `retryAfter` field in seconds.
///
/// # Example
///
/// ```rust,ignore
/// let api = api_routes()
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_id(req.headers(), peer, state.behind_proxy);

    let limiter = state.rate_limiter.as_ref();
    let decision = limiter.check(&client).await;

    if !decision.allowed {
        let retry_after_secs = decision.retry_after_secs(limiter.now(), limiter.window_ms());

        let mut response = AppError::RateLimited {
            max_requests: limiter.max_requests(),
            window_ms: limiter.window_ms(),
            retry_after_secs,
        }
        .into_response();

        let headers = response.headers_mut();
        set_limit_headers(headers, limiter, &decision);
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        if let Some(reset) = decision.reset_time
            && let Ok(value) =
                HeaderValue::from_str(&reset.to_rfc3339_opts(SecondsFormat::Millis, true))
        {
            headers.insert(X_RATELIMIT_RESET, value);
        }

        return response;
    }

    let mut response = next.run(req).await;
    set_limit_headers(response.headers_mut(), limiter, &decision);
    response
}

fn set_limit_headers(headers: &mut HeaderMap, limiter: &RateLimiter, decision: &RateLimitDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limiter.max_requests()));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_WINDOW, HeaderValue::from(limiter.window_ms()));
}
