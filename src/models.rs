use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Directory user. The password column holds a hash and is never serialized.
#[derive(Serialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub department_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    pub department_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Location {
    pub id: i64,
    pub location: String,
    pub zone: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated payload of `POST /v1/create_user`
#[derive(Deserialize, Debug)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub department_id: Option<i64>,
}

/// Validated payload of `PUT /v1/users/{id}`
#[derive(Deserialize, Debug, Default)]
pub struct UpdateCredentialsRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Row data for a user insert; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.password_hash.is_none()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct DepartmentChanges {
    #[serde(default)]
    pub name: Option<String>,
    /// `Some(None)` clears the description
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewUnit {
    pub name: String,
    pub department_id: i64,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UnitChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewLocation {
    pub location: String,
    pub zone: String,
    pub state: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LocationChanges {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

// Distinguishes an explicit `null` from an absent field.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
