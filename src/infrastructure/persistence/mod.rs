//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx with bound
//! parameters. The schema lives in `migrations/` and is applied at startup.

pub mod pg_url_repository;

pub use pg_url_repository::{PgUrlRepository, TableStats};
