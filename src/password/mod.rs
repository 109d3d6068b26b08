//! Password hashing for stored user credentials.
//!
//! Hashes are written in the self-describing formats of their algorithm
//! (PHC `$argon2id$...` and modular-crypt `$2b$...`), so switching
//! `password.algorithm` only affects passwords set afterwards.

use serde::{Deserialize, Serialize};

use crate::config::PasswordConfig;
use crate::error::{AppError, AppResult};

mod argon2_hasher;
mod bcrypt_hasher;

use argon2_hasher::Argon2idHasher;
use bcrypt_hasher::BcryptHasher;

/// Value of `password.algorithm`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    Bcrypt,
    #[default]
    Argon2id,
}

trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> AppResult<String>;
}

/// Hashes new passwords with the configured algorithm
pub struct PasswordManager {
    hasher: Box<dyn PasswordHasher>,
}

impl PasswordManager {
    /// Fails on a bcrypt cost outside 4..=31
    pub fn from_config(config: &PasswordConfig) -> AppResult<Self> {
        let hasher: Box<dyn PasswordHasher> = match config.algorithm {
            PasswordAlgorithm::Argon2id => Box::new(Argon2idHasher::default()),
            PasswordAlgorithm::Bcrypt => Box::new(BcryptHasher::with_cost(config.bcrypt_cost)?),
        };

        Ok(Self { hasher })
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        if password.is_empty() {
            return Err(AppError::BadRequest("Password cannot be empty".to_string()));
        }
        self.hasher.hash_password(password)
    }
}
