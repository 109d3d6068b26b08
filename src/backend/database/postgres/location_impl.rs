use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};

use super::super::{map_database_error, LOCATION_COLUMNS};
use super::PostgresBackend;
use crate::backend::{LocationBackend, PageRequest, Table};
use crate::error::AppResult;
use crate::models::{Location, LocationChanges, NewLocation};

#[async_trait]
impl LocationBackend for PostgresBackend {
    async fn create_location(&self, location: &NewLocation) -> AppResult<Location> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO locations (location, zone, state, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            LOCATION_COLUMNS
        );

        sqlx::query_as::<_, Location>(&sql)
            .bind(&location.location)
            .bind(&location.zone)
            .bind(&location.state)
            .bind(now)
            .bind(now)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to create location"))
    }

    async fn find_location_by_id(&self, id: i64) -> AppResult<Option<Location>> {
        let sql = format!("SELECT {} FROM locations WHERE id = $1", LOCATION_COLUMNS);

        sqlx::query_as::<_, Location>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to find location"))
    }

    async fn find_all_locations(&self) -> AppResult<Vec<Location>> {
        let sql = format!("SELECT {} FROM locations ORDER BY id", LOCATION_COLUMNS);

        sqlx::query_as::<_, Location>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to list locations"))
    }

    async fn find_locations_page(&self, page: PageRequest) -> AppResult<(Vec<Location>, i64)> {
        let sql = format!(
            "SELECT {} FROM locations ORDER BY id LIMIT $1 OFFSET $2",
            LOCATION_COLUMNS
        );

        let locations = sqlx::query_as::<_, Location>(&sql)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to list locations"))?;

        let total = self.count_rows(Table::Locations).await?;
        Ok((locations, total))
    }

    async fn update_location(
        &self,
        id: i64,
        changes: &LocationChanges,
    ) -> AppResult<Option<Location>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE locations SET updated_at = ");
        query.push_bind(Utc::now());

        for (column, value) in [
            ("location", &changes.location),
            ("zone", &changes.zone),
            ("state", &changes.state),
        ] {
            if let Some(value) = value {
                query.push(format!(", {} = ", column));
                query.push_bind(value.clone());
            }
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {}", LOCATION_COLUMNS));

        query
            .build_query_as::<Location>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to update location"))
    }

    async fn delete_location(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| map_database_error(e, "Failed to delete location"))?;

        Ok(result.rows_affected() > 0)
    }
}
