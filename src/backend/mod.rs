use crate::error::AppResult;
use crate::models::{
    Department, DepartmentChanges, Location, LocationChanges, NewDepartment, NewLocation,
    NewUnit, NewUser, Unit, UnitChanges, User, UserChanges,
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod database;

/// Supported database backend types
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

/// Tables that validation rules may look values up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Departments,
    Units,
    Locations,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Departments => "departments",
            Table::Units => "units",
            Table::Locations => "locations",
        }
    }
}

/// Scalar value used for uniqueness/existence lookups.
/// Text is compared case-insensitively, integers exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookupValue<'a> {
    Text(&'a str),
    Integer(i64),
}

/// One-based page request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Rows to skip; saturates so far-off pages just come back empty
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// A page of rows plus the total row count
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    pub fn last_page(&self) -> i64 {
        if self.total == 0 {
            1
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }
}

/// Core backend abstraction
///
/// Connection handling and schema management shared by every storage
/// implementation (PostgreSQL, SQLite).
#[async_trait]
pub trait Backend: Send + Sync {
    /// Connect and initialize the storage backend
    async fn connect(config: &crate::backend::database::DatabaseBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Check if the storage backend is healthy and accessible
    async fn health_check(&self) -> AppResult<()>;

    /// Create tables and indexes if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;

    /// Clean up resources when storage is no longer needed
    async fn cleanup(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Read-only lookups backing the `unique` and `exists` validation rules
#[async_trait]
pub trait LookupBackend: Send + Sync {
    /// Whether `table.column` holds `value`, optionally ignoring the row with `ignore_id`
    async fn value_exists(
        &self,
        table: Table,
        column: &'static str,
        value: LookupValue<'_>,
        ignore_id: Option<i64>,
    ) -> AppResult<bool>;
}

#[async_trait]
pub trait UserBackend: Backend {
    async fn create_user(&self, user: &NewUser) -> AppResult<User>;

    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive)
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_users_page(&self, page: PageRequest) -> AppResult<(Vec<User>, i64)>;

    /// Apply the supplied fields; `None` when the user does not exist
    async fn update_user(&self, id: i64, changes: &UserChanges) -> AppResult<Option<User>>;

    async fn set_user_department(
        &self,
        id: i64,
        department_id: Option<i64>,
    ) -> AppResult<Option<User>>;

    /// Delete a user, returning whether a row was removed
    async fn delete_user(&self, id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait DepartmentBackend: Backend {
    async fn create_department(&self, department: &NewDepartment) -> AppResult<Department>;

    async fn find_department_by_id(&self, id: i64) -> AppResult<Option<Department>>;

    async fn find_all_departments(&self) -> AppResult<Vec<Department>>;

    async fn find_departments_page(&self, page: PageRequest)
        -> AppResult<(Vec<Department>, i64)>;

    async fn update_department(
        &self,
        id: i64,
        changes: &DepartmentChanges,
    ) -> AppResult<Option<Department>>;

    /// Delete a department; its users are detached and its units removed
    async fn delete_department(&self, id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait UnitBackend: Backend {
    async fn create_unit(&self, unit: &NewUnit) -> AppResult<Unit>;

    async fn find_unit_by_id(&self, id: i64) -> AppResult<Option<Unit>>;

    async fn find_all_units(&self) -> AppResult<Vec<Unit>>;

    async fn find_units_page(&self, page: PageRequest) -> AppResult<(Vec<Unit>, i64)>;

    async fn find_units_by_department_id(&self, department_id: i64) -> AppResult<Vec<Unit>>;

    async fn update_unit(&self, id: i64, changes: &UnitChanges) -> AppResult<Option<Unit>>;

    async fn delete_unit(&self, id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait LocationBackend: Backend {
    async fn create_location(&self, location: &NewLocation) -> AppResult<Location>;

    async fn find_location_by_id(&self, id: i64) -> AppResult<Option<Location>>;

    async fn find_all_locations(&self) -> AppResult<Vec<Location>>;

    async fn find_locations_page(&self, page: PageRequest) -> AppResult<(Vec<Location>, i64)>;

    async fn update_location(
        &self,
        id: i64,
        changes: &LocationChanges,
    ) -> AppResult<Option<Location>>;

    async fn delete_location(&self, id: i64) -> AppResult<bool>;
}

/// Combined backend interface for every directory resource
pub trait DirectoryBackend:
    LookupBackend + UserBackend + DepartmentBackend + UnitBackend + LocationBackend
{
}

/// Automatic implementation for any type that implements all resource traits
impl<T> DirectoryBackend for T where
    T: LookupBackend + UserBackend + DepartmentBackend + UnitBackend + LocationBackend
{
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on configuration
    pub async fn create(
        config: &crate::backend::database::DatabaseBackendConfig,
    ) -> AppResult<Arc<dyn DirectoryBackend>> {
        let backend = Self::create_backend(config).await?;
        Ok(Arc::from(backend))
    }

    /// Create a backend based on configuration (returns Box)
    pub async fn create_backend(
        config: &crate::backend::database::DatabaseBackendConfig,
    ) -> AppResult<Box<dyn DirectoryBackend>> {
        match config.database_type {
            DatabaseType::PostgreSQL => {
                let backend =
                    crate::backend::database::postgres::PostgresBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
            DatabaseType::SQLite => {
                let backend =
                    crate::backend::database::sqlite::SqliteBackend::connect(config).await?;
                Ok(Box::new(backend))
            }
        }
    }
}
