//! Core domain entities.
//!
//! - [`UrlRecord`] - A stored short URL (also the cache snapshot shape)
//! - [`NewUrlRecord`] - Input for creating a record

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlRecord};
