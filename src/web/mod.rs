//! Browser-facing HTML pages.
//!
//! Uses Askama templates for server-side rendering. The only page is the
//! failure page shown when a short URL cannot be redirected.

pub mod error_page;

pub use error_page::ErrorPage;
