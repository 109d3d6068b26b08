use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{decode, ensure_valid, ServiceError, ServiceResult};
use crate::backend::{DirectoryBackend, Page, PageRequest, Table};
use crate::error::AppError;
use crate::models::{CreateUserRequest, NewUser, UpdateCredentialsRequest, User, UserChanges};
use crate::password::PasswordManager;
use crate::validation::{Rule, ValidationErrors, Validator};

pub struct UserService {
    backend: Arc<dyn DirectoryBackend>,
    passwords: Arc<PasswordManager>,
}

impl UserService {
    pub fn new(backend: Arc<dyn DirectoryBackend>, passwords: Arc<PasswordManager>) -> Self {
        Self { backend, passwords }
    }

    fn create_rules() -> Validator {
        Validator::new()
            .field(
                "email",
                [Rule::Required, Rule::Email, Rule::unique(Table::Users, "email")],
            )
            .field("name", [Rule::Required, Rule::String, Rule::Max(255)])
            .field("password", [Rule::Required, Rule::String, Rule::Min(8)])
            .field(
                "department_id",
                [
                    Rule::Sometimes,
                    Rule::Nullable,
                    Rule::Integer,
                    Rule::exists(Table::Departments, "id"),
                ],
            )
    }

    fn credential_rules() -> Validator {
        Validator::new()
            .field("email", [Rule::Sometimes, Rule::Email])
            .field("name", [Rule::Sometimes, Rule::String, Rule::Max(255)])
            .field("password", [Rule::Sometimes, Rule::String, Rule::Min(8)])
    }

    /// Validate and persist a new user with a hashed password
    pub async fn create(&self, input: Map<String, Value>) -> ServiceResult<User> {
        let errors = Self::create_rules()
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let request: CreateUserRequest = decode(input)?;
        let new_user = NewUser {
            email: request.email,
            name: request.name,
            password_hash: self.passwords.hash_password(&request.password)?,
            department_id: request.department_id,
        };

        match self.backend.create_user(&new_user).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Created user");
                Ok(user)
            }
            // Lost a race with a concurrent insert of the same email
            Err(AppError::UniqueViolation(_)) => Err(ServiceError::Validation(
                ValidationErrors::single(
                    "email",
                    crate::validation::rule::unique_message("email"),
                ),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Change any of email, name and password.
    ///
    /// Validation runs before the lookup, so malformed input is reported even
    /// for unknown ids. Only the supplied fields are written.
    pub async fn update_user_credentials(
        &self,
        id: i64,
        input: Map<String, Value>,
    ) -> ServiceResult<User> {
        let errors = Self::credential_rules()
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let request: UpdateCredentialsRequest = decode(input)?;

        let current = self
            .backend
            .find_user_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if let Some(email) = &request.email {
            if !email.eq_ignore_ascii_case(&current.email) {
                if let Some(other) = self.backend.find_user_by_email(email).await? {
                    if other.id != current.id {
                        tracing::debug!(user_id = id, "Email already belongs to another user");
                        return Err(ServiceError::Conflict(
                            "Email already in use by another user".to_string(),
                        ));
                    }
                }
            }
        }

        let changes = UserChanges {
            email: request.email,
            name: request.name,
            password_hash: request
                .password
                .as_deref()
                .map(|password| self.passwords.hash_password(password))
                .transpose()?,
        };

        if changes.is_empty() {
            return Ok(current);
        }

        match self.backend.update_user(id, &changes).await {
            Ok(Some(user)) => Ok(user),
            // Deleted between the lookup and the write
            Ok(None) => Err(ServiceError::NotFound),
            Err(AppError::UniqueViolation(_)) => Err(ServiceError::Conflict(
                "Email already in use by another user".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_users_for_page(&self, page: PageRequest) -> ServiceResult<Page<User>> {
        let (items, total) = self.backend.find_users_page(page).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    pub async fn get_user(&self, id: i64) -> ServiceResult<User> {
        self.backend
            .find_user_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Delete by the `id` carried in the request body
    pub async fn delete_user(&self, input: Map<String, Value>) -> ServiceResult<()> {
        let errors = Validator::new()
            .field("id", [Rule::Required, Rule::Integer])
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let id = input.get("id").and_then(Value::as_i64).ok_or_else(|| {
            ServiceError::Backend(AppError::Internal("validated id missing".to_string()))
        })?;

        if self.backend.delete_user(id).await? {
            tracing::info!(user_id = id, "Deleted user");
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }

    /// Attach a user to a department; both must exist
    pub async fn assign_user_to_department(
        &self,
        user_id: Value,
        department_id: Value,
    ) -> ServiceResult<User> {
        let input = json!({ "user_id": user_id, "department_id": department_id });
        let input = input.as_object().cloned().unwrap_or_default();

        let errors = Validator::new()
            .field(
                "user_id",
                [Rule::Required, Rule::Integer, Rule::exists(Table::Users, "id")],
            )
            .field(
                "department_id",
                [
                    Rule::Required,
                    Rule::Integer,
                    Rule::exists(Table::Departments, "id"),
                ],
            )
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let (Some(user_id), Some(department_id)) = (
            input.get("user_id").and_then(Value::as_i64),
            input.get("department_id").and_then(Value::as_i64),
        ) else {
            return Err(ServiceError::Backend(AppError::Internal(
                "validated ids missing".to_string(),
            )));
        };

        self.backend
            .set_user_department(user_id, Some(department_id))
            .await?
            .ok_or(ServiceError::NotFound)
    }
}
