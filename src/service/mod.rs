//! Business operations for each directory resource.
//!
//! Services validate raw JSON input, talk to the [`DirectoryBackend`] and
//! report outcomes as a [`ServiceResult`]. Handlers never inspect storage
//! errors directly; they match on [`ServiceError`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::backend::DirectoryBackend;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::password::PasswordManager;
use crate::validation::ValidationErrors;

pub mod department;
pub mod location;
pub mod unit;
pub mod user;

pub use department::DepartmentService;
pub use location::LocationService;
pub use unit::UnitService;
pub use user::UserService;

#[derive(Debug)]
pub enum ServiceError {
    /// Input failed one or more field rules
    Validation(ValidationErrors),
    /// The target record does not exist
    NotFound,
    /// The change collides with another record
    Conflict(String),
    Backend(AppError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(errors) => {
                write!(f, "Validation failed: {}", serde_json::json!(errors))
            }
            ServiceError::NotFound => write!(f, "Record not found"),
            ServiceError::Conflict(e) => write!(f, "Conflict: {}", e),
            ServiceError::Backend(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        ServiceError::Backend(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(errors)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Turn validated input into its typed request struct
pub(crate) fn decode<T: DeserializeOwned>(input: Map<String, Value>) -> ServiceResult<T> {
    serde_json::from_value(Value::Object(input))
        .map_err(|e| ServiceError::Backend(AppError::from(e)))
}

/// Ok when the validator reported nothing
pub(crate) fn ensure_valid(errors: ValidationErrors) -> ServiceResult<()> {
    errors.into_result().map_err(ServiceError::Validation)
}

/// All services sharing one backend
pub struct Services {
    pub users: UserService,
    pub departments: DepartmentService,
    pub units: UnitService,
    pub locations: LocationService,
    backend: Arc<dyn DirectoryBackend>,
}

impl Services {
    pub fn new(backend: Arc<dyn DirectoryBackend>, config: &AppConfig) -> AppResult<Self> {
        let passwords = Arc::new(PasswordManager::from_config(&config.password)?);

        Ok(Self {
            users: UserService::new(backend.clone(), passwords),
            departments: DepartmentService::new(backend.clone()),
            units: UnitService::new(backend.clone()),
            locations: LocationService::new(backend.clone()),
            backend,
        })
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::backend::BackendFactory;
    use crate::backend::database::DatabaseBackendConfig;

    pub async fn memory_backend() -> Arc<dyn DirectoryBackend> {
        let backend = BackendFactory::create(&DatabaseBackendConfig::memory_sqlite())
            .await
            .unwrap();
        backend.init_schema().await.unwrap();
        backend
    }

    pub fn input(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }
}
