use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};

use super::super::{map_database_error, USER_COLUMNS};
use super::PostgresBackend;
use crate::backend::{PageRequest, Table, UserBackend};
use crate::error::AppResult;
use crate::models::{NewUser, User, UserChanges};

#[async_trait]
impl UserBackend for PostgresBackend {
    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (email, name, password, department_id, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
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
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to find user"))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
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
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
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
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = ");
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
            "UPDATE users SET department_id = $1, updated_at = $2 WHERE id = $3 RETURNING {}",
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
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to delete user"))?;

        Ok(result.rows_affected() > 0)
    }
}
