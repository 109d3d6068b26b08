use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::super::{map_database_error, USER_COLUMNS};
use super::SqliteBackend;
use crate::backend::{PageRequest, Table, UserBackend};
use crate::error::AppResult;
use crate::models::{NewUser, User, UserChanges};

#[async_trait]
impl UserBackend for SqliteBackend {
    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (email, name, password, department_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.department_id)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to create user"))
    }

    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to find user"))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER(?1)",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to find user by email"))
    }

    async fn find_users_page(&self, page: PageRequest) -> AppResult<(Vec<User>, i64)> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT ?1 OFFSET ?2",
            USER_COLUMNS
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to list users"))?;

        let total = self.count_rows(Table::Users).await?;
        Ok((users, total))
    }

    async fn update_user(&self, id: i64, changes: &UserChanges) -> AppResult<Option<User>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(email) = &changes.email {
            query.push(", email = ");
            query.push_bind(email.clone());
        }
        if let Some(name) = &changes.name {
            query.push(", name = ");
            query.push_bind(name.clone());
        }
        if let Some(password_hash) = &changes.password_hash {
            query.push(", password = ");
            query.push_bind(password_hash.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {}", USER_COLUMNS));

        query
            .build_query_as::<User>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to update user"))
    }

    async fn set_user_department(
        &self,
        id: i64,
        department_id: Option<i64>,
    ) -> AppResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET department_id = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(department_id)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to assign user department"))
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to delete user"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::database::DatabaseBackendConfig;
    use crate::backend::Backend;
    use crate::error::AppError;

    async fn memory_backend() -> SqliteBackend {
        let backend = SqliteBackend::connect(&DatabaseBackendConfig::memory_sqlite())
            .await
            .unwrap();
        backend.init_schema().await.unwrap();
        backend
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash: "hash".to_string(),
            department_id: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let backend = memory_backend().await;
        backend.create_user(&new_user("dup@example.com")).await.unwrap();

        let err = backend
            .create_user(&new_user("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let backend = memory_backend().await;
        let user = backend.create_user(&new_user("a@example.com")).await.unwrap();

        let changes = UserChanges {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = backend.update_user(user.id, &changes).await.unwrap().unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "a@example.com");
        assert_eq!(updated.password, "hash");

        let missing = backend.update_user(999, &changes).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_users_page() {
        let backend = memory_backend().await;
        for i in 0..5 {
            backend
                .create_user(&new_user(&format!("user{}@example.com", i)))
                .await
                .unwrap();
        }

        let (users, total) = backend.find_users_page(PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "user2@example.com");
    }

    #[tokio::test]
    async fn test_delete_user_reports_existence() {
        let backend = memory_backend().await;
        let user = backend.create_user(&new_user("gone@example.com")).await.unwrap();

        assert!(backend.delete_user(user.id).await.unwrap());
        assert!(!backend.delete_user(user.id).await.unwrap());
    }
}
