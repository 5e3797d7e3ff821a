//! Utility functions for code generation, validation, time, and request handling.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`url_validator`] - Long URL validation
//! - [`clock`] - Injectable time source
//! - [`client_ip`] - Client identifier extraction for rate limiting
//! - [`db_error`] - Database error classification

pub mod client_ip;
pub mod clock;
pub mod code_generator;
pub mod db_error;
pub mod url_validator;
