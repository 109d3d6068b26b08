pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod models;
pub mod password;
pub mod resource;
pub mod service;
pub mod startup;
pub mod validation;

// Re-export commonly used types for easier access
pub use models::{Department, Location, Unit, User};
pub use startup::{build_app, setup_backend};
