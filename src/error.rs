//! Application error taxonomy and its HTTP representation.
//!
//! Domain outcomes (`NotFound`, `Expired`, `CustomCodeTaken`, validation) are expected
//! results and are rendered as 4xx/410 responses. Store failures become 5xx responses.
//! Cache failures never reach this type: callers absorb them (see
//! [`crate::infrastructure::cache`]).

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Stable JSON error envelope returned by every API endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
    pub details: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// No record exists for the short code.
    #[error("URL not found")]
    NotFound { short_code: String },

    /// The record existed but its `expires_at` has passed.
    #[error("URL expired")]
    Expired { short_code: String },

    #[error("Invalid URL")]
    InvalidUrl { reason: String },

    /// The requested code is in use, including collisions detected by the
    /// store's unique constraint after an availability check passed.
    #[error("Custom code unavailable")]
    CustomCodeTaken { short_code: String },

    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("Rate limit exceeded")]
    RateLimited {
        max_requests: u32,
        window_ms: u64,
        retry_after_secs: u64,
    },

    #[error("Service temporarily unavailable")]
    ServiceUnavailable { reason: String },

    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Expired { .. } => StatusCode::GONE,
            AppError::InvalidUrl { .. } | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::CustomCodeTaken { .. } => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true for failures of the service itself rather than of the request.
    pub fn is_system_failure(&self) -> bool {
        matches!(
            self,
            AppError::ServiceUnavailable { .. } | AppError::Internal { .. }
        )
    }

    /// Builds the JSON envelope for this error.
    pub fn to_body(&self) -> ErrorBody {
        let details = match self {
            AppError::NotFound { .. } => {
                vec!["The requested short URL does not exist".to_string()]
            }
            AppError::Expired { .. } => {
                vec!["This short URL has expired and is no longer valid".to_string()]
            }
            AppError::InvalidUrl { reason } => vec![reason.clone()],
            AppError::CustomCodeTaken { short_code } => {
                vec![format!("The short code '{}' is already in use", short_code)]
            }
            AppError::Validation { details, .. } => details.clone(),
            AppError::RateLimited {
                max_requests,
                window_ms,
                ..
            } => vec![format!(
                "Too many requests. Maximum {} requests per {} seconds.",
                max_requests,
                window_ms / 1000
            )],
            AppError::ServiceUnavailable { .. } => {
                vec!["A backing service is unreachable".to_string()]
            }
            AppError::Internal { .. } => Vec::new(),
        };

        let retry_after = match self {
            AppError::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        };

        ErrorBody {
            error: true,
            message: self.to_string(),
            details,
            timestamp: Utc::now(),
            retry_after,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_system_failure() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        // Internal details stay in the logs.
        let mut body = self.to_body();
        if let AppError::Internal { .. } = self {
            body.message = "Internal Server Error".to_string();
        }

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::ServiceUnavailable {
                    reason: e.to_string(),
                }
            }
            _ => AppError::Internal {
                message: format!("Database error: {}", e),
            },
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        details.sort();

        AppError::validation("Validation Error", details)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("Validation Error", vec![rejection.body_text()])
    }
}
