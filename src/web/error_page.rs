//! HTML failure page for browser-facing redirects.

use askama::Template;
use askama_web::WebTemplate;
use axum::http::StatusCode;

use crate::error::AppError;

/// Template for redirect failures.
///
/// Renders `templates/error_page.html` with a link back to the service home.
#[derive(Template, WebTemplate)]
#[template(path = "error_page.html")]
pub struct ErrorPage {
    pub title: &'static str,
    pub message: &'static str,
    pub description: &'static str,
    pub home_url: String,
}

impl ErrorPage {
    pub fn not_found(home_url: impl Into<String>) -> Self {
        Self {
            title: "URL Not Found",
            message: "The short URL you requested does not exist.",
            description: "This link may have been mistyped or the URL may have been removed.",
            home_url: home_url.into(),
        }
    }

    pub fn expired(home_url: impl Into<String>) -> Self {
        Self {
            title: "URL Expired",
            message: "This short URL has expired and is no longer valid.",
            description: "The link you followed has reached its expiration date.",
            home_url: home_url.into(),
        }
    }

    pub fn service_error(home_url: impl Into<String>) -> Self {
        Self {
            title: "Service Error",
            message: "We're experiencing technical difficulties.",
            description: "Please try again later or contact support if the problem persists.",
            home_url: home_url.into(),
        }
    }

    /// Picks the page and status code for a failed resolution.
    ///
    /// Unknown codes render 404, expired codes 410, anything else 500.
    pub fn for_error(error: &AppError, home_url: impl Into<String>) -> (StatusCode, Self) {
        match error {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, Self::not_found(home_url)),
            AppError::Expired { .. } => (StatusCode::GONE, Self::expired(home_url)),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Self::service_error(home_url),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let home = "http://localhost:3000";

        let (status, page) = ErrorPage::for_error(
            &AppError::Expired {
                short_code: "abc".into(),
            },
            home,
        );
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(page.title, "URL Expired");

        let (status, _) = ErrorPage::for_error(
            &AppError::NotFound {
                short_code: "abc".into(),
            },
            home,
        );
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = ErrorPage::for_error(&AppError::internal("db down"), home);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_renders_home_link() {
        let html = ErrorPage::not_found("https://swift.example").render().unwrap();

        assert!(html.contains("URL Not Found - SwiftURL"));
        assert!(html.contains(r#"href="https://swift.example""#));
    }
}
