//! Long URL validation.

use crate::error::AppError;
use url::Url;

/// Maximum accepted length of a long URL, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// Validates that `raw` is an absolute HTTP/HTTPS URL with a host and at most
/// [`MAX_URL_LENGTH`] characters.
///
/// The URL is stored exactly as given; validation does not rewrite it, so
/// whitespace and control characters that the parser would silently drop are
/// rejected.
///
/// # Errors
///
/// Returns [`AppError::InvalidUrl`] describing the first rule that failed.
pub fn validate_long_url(raw: &str) -> Result<(), AppError> {
    if raw.chars().count() > MAX_URL_LENGTH {
        return Err(AppError::InvalidUrl {
            reason: format!("URL cannot be longer than {} characters", MAX_URL_LENGTH),
        });
    }

    if raw.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(AppError::InvalidUrl {
            reason: "URL cannot contain whitespace or control characters".to_string(),
        });
    }

    let parsed = Url::parse(raw).map_err(|_| AppError::InvalidUrl {
        reason: "Please provide a valid URL starting with http:// or https://".to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::InvalidUrl {
            reason: format!("Unsupported URL scheme '{}'", parsed.scheme()),
        });
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::InvalidUrl {
            reason: "URL must contain a host".to_string(),
        });
    }

    Ok(())
}
