use argon2::password_hash::{PasswordHasher as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use super::PasswordHasher;
use crate::error::{AppError, AppResult};

/// Argon2id v1.3 with the crate's default cost parameters
pub(super) struct Argon2idHasher {
    argon2: Argon2<'static>,
}

impl Default for Argon2idHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }
}

impl PasswordHasher for Argon2idHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Argon2id hashing failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    #[test]
    fn test_hash_is_verifiable_phc_string() {
        let hash = Argon2idHasher::default()
            .hash_password("correct horse battery")
            .unwrap();
        assert!(hash.starts_with("$argon2id$v=19$"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"correct horse battery", &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong horse battery", &parsed)
            .is_err());
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let hasher = Argon2idHasher::default();
        assert_ne!(
            hasher.hash_password("same password").unwrap(),
            hasher.hash_password("same password").unwrap()
        );
    }
}
