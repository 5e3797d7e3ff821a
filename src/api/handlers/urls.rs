//! Handler for the URL listing endpoint.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::api::dto::urls::{ListUrlsQuery, ListUrlsResponse, PaginationMeta, UrlListItem};
use crate::error::AppError;
use crate::state::AppState;

/// Lists short URLs, newest first.
///
/// # Endpoint
///
/// `GET /api/urls?limit=50&offset=0`
///
/// # Query Parameters
///
/// - `limit`: defaults to 50, capped at 100
/// - `offset`: defaults to 0
pub async fn list_urls_handler(
    State(state): State<AppState>,
    query: Result<Query<ListUrlsQuery>, QueryRejection>,
) -> Result<Json<ListUrlsResponse>, AppError> {
    let Query(query) =
        query.map_err(|e| AppError::validation("Validation Error", vec![e.body_text()]))?;

    let page = state
        .url_service
        .list_urls(query.limit, query.offset)
        .await?;

    let data: Vec<UrlListItem> = page.urls.into_iter().map(UrlListItem::from).collect();

    Ok(Json(ListUrlsResponse {
        success: true,
        message: "URLs retrieved successfully".to_string(),
        pagination: PaginationMeta {
            limit: page.limit,
            offset: page.offset,
            count: data.len(),
        },
        data,
    }))
}
