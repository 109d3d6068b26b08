use super::PasswordHasher;
use crate::error::{AppError, AppResult};

const COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

pub(super) struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// `cost` comes from `password.bcrypt_cost`
    pub(super) fn with_cost(cost: u32) -> AppResult<Self> {
        if !COST_RANGE.contains(&cost) {
            return Err(AppError::Configuration(format!(
                "password.bcrypt_cost must be between {} and {}, got {}",
                COST_RANGE.start(),
                COST_RANGE.end(),
                cost
            )));
        }
        Ok(Self { cost })
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("bcrypt hashing failed: {}", e)))
    }
}
