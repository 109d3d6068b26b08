use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::super::{map_database_error, UNIT_COLUMNS};
use super::SqliteBackend;
use crate::backend::{PageRequest, Table, UnitBackend};
use crate::error::AppResult;
use crate::models::{NewUnit, Unit, UnitChanges};

#[async_trait]
impl UnitBackend for SqliteBackend {
    async fn create_unit(&self, unit: &NewUnit) -> AppResult<Unit> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO units (name, department_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4) RETURNING {}",
            UNIT_COLUMNS
        );

        sqlx::query_as::<_, Unit>(&sql)
            .bind(&unit.name)
            .bind(unit.department_id)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to create unit"))
    }

    async fn find_unit_by_id(&self, id: i64) -> AppResult<Option<Unit>> {
        let sql = format!("SELECT {} FROM units WHERE id = ?1", UNIT_COLUMNS);

        sqlx::query_as::<_, Unit>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to find unit"))
    }

    async fn find_all_units(&self) -> AppResult<Vec<Unit>> {
        let sql = format!("SELECT {} FROM units ORDER BY id", UNIT_COLUMNS);

        sqlx::query_as::<_, Unit>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to list units"))
    }

    async fn find_units_page(&self, page: PageRequest) -> AppResult<(Vec<Unit>, i64)> {
        let sql = format!(
            "SELECT {} FROM units ORDER BY id LIMIT ?1 OFFSET ?2",
            UNIT_COLUMNS
        );

        let units = sqlx::query_as::<_, Unit>(&sql)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to list units"))?;

        let total = self.count_rows(Table::Units).await?;
        Ok((units, total))
    }

    async fn find_units_by_department_id(&self, department_id: i64) -> AppResult<Vec<Unit>> {
        let sql = format!(
            "SELECT {} FROM units WHERE department_id = ?1 ORDER BY id",
            UNIT_COLUMNS
        );

        sqlx::query_as::<_, Unit>(&sql)
            .bind(department_id)
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to list units of department"))
    }

    async fn update_unit(&self, id: i64, changes: &UnitChanges) -> AppResult<Option<Unit>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE units SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(name) = &changes.name {
            query.push(", name = ");
            query.push_bind(name.clone());
        }
        if let Some(department_id) = changes.department_id {
            query.push(", department_id = ");
            query.push_bind(department_id);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {}", UNIT_COLUMNS));

        query
            .build_query_as::<Unit>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to update unit"))
    }

    async fn delete_unit(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM units WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to delete unit"))?;

        Ok(result.rows_affected() > 0)
    }
}
