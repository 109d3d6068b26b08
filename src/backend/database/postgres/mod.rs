//! PostgreSQL implementation of the directory backend

pub mod backend_impl;
pub mod department_impl;
pub mod location_impl;
pub mod schema;
pub mod unit_impl;
pub mod user_impl;

pub use backend_impl::PostgresBackend;
