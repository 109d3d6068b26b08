//! Database abstraction layer for the directory backend
//!
//! This module provides a unified interface for database operations across
//! different database backends (PostgreSQL, SQLite) while keeping the SQL
//! for each engine in its own module.
//!
//! # Architecture
//!
//! ```text
//! Shared pieces (config.rs, column lists, error mapping)
//!     ↓
//! Database-specific implementations
//!     ├── postgres/ (PostgreSQL-specific code)
//!     └── sqlite/   (SQLite-specific code)
//! ```

pub mod config;
pub mod postgres;
pub mod sqlite;

pub use config::DatabaseBackendConfig;

use std::time::Duration;

use crate::error::AppError;

pub(crate) const USER_COLUMNS: &str =
    "id, email, name, password, department_id, created_at, updated_at";
pub(crate) const DEPARTMENT_COLUMNS: &str = "id, name, description, created_at, updated_at";
pub(crate) const UNIT_COLUMNS: &str = "id, name, department_id, created_at, updated_at";
pub(crate) const LOCATION_COLUMNS: &str = "id, location, zone, state, created_at, updated_at";

/// How long a request waits for a pooled connection
pub(crate) const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Add the failing operation to a database error.
///
/// Unique violations keep their own kind (see `From<sqlx::Error> for AppError`)
/// so services can turn them into validation errors or conflicts.
pub fn map_database_error(error: sqlx::Error, context: &str) -> AppError {
    match AppError::from(error) {
        AppError::Database(detail) => AppError::Database(format!("{}: {}", context, detail)),
        other => other,
    }
}
