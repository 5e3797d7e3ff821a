//! Click event model for asynchronous click accounting.

use chrono::{DateTime, Utc};

/// A redirect that should be added to the stored click counter.
///
/// Created by [`crate::application::services::UrlService::record_click`] after the
/// cache counter has been incremented, and sent through a bounded channel to
/// [`crate::domain::click_worker::run_click_worker`]. The redirect response never
/// waits for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub short_code: String,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a new click event.
    pub fn new(short_code: impl Into<String>, clicked_at: DateTime<Utc>) -> Self {
        Self {
            short_code: short_code.into(),
            clicked_at,
        }
    }
}
