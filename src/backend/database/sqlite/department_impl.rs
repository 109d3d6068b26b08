use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::super::{map_database_error, DEPARTMENT_COLUMNS};
use super::SqliteBackend;
use crate::backend::{DepartmentBackend, PageRequest, Table};
use crate::error::AppResult;
use crate::models::{Department, DepartmentChanges, NewDepartment};

#[async_trait]
impl DepartmentBackend for SqliteBackend {
    async fn create_department(&self, department: &NewDepartment) -> AppResult<Department> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO departments (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4) RETURNING {}",
            DEPARTMENT_COLUMNS
        );

        sqlx::query_as::<_, Department>(&sql)
            .bind(&department.name)
            .bind(&department.description)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to create department"))
    }

    async fn find_department_by_id(&self, id: i64) -> AppResult<Option<Department>> {
        let sql = format!("SELECT {} FROM departments WHERE id = ?1", DEPARTMENT_COLUMNS);

        sqlx::query_as::<_, Department>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to find department"))
    }

    async fn find_all_departments(&self) -> AppResult<Vec<Department>> {
        let sql = format!("SELECT {} FROM departments ORDER BY id", DEPARTMENT_COLUMNS);

        sqlx::query_as::<_, Department>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to list departments"))
    }

    async fn find_departments_page(
        &self,
        page: PageRequest,
    ) -> AppResult<(Vec<Department>, i64)> {
        let sql = format!(
            "SELECT {} FROM departments ORDER BY id LIMIT ?1 OFFSET ?2",
            DEPARTMENT_COLUMNS
        );

        let departments = sqlx::query_as::<_, Department>(&sql)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to list departments"))?;

        let total = self.count_rows(Table::Departments).await?;
        Ok((departments, total))
    }

    async fn update_department(
        &self,
        id: i64,
        changes: &DepartmentChanges,
    ) -> AppResult<Option<Department>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE departments SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(name) = &changes.name {
            query.push(", name = ");
            query.push_bind(name.clone());
        }
        if let Some(description) = &changes.description {
            query.push(", description = ");
            query.push_bind(description.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {}", DEPARTMENT_COLUMNS));

        query
            .build_query_as::<Department>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to update department"))
    }

    async fn delete_department(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM departments WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to delete department"))?;

        Ok(result.rows_affected() > 0)
    }
}
