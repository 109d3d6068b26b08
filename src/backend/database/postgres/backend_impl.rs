use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::super::config::DatabaseBackendConfig;
use super::super::{map_database_error, ACQUIRE_TIMEOUT};
use super::schema;
use crate::backend::{Backend, LookupBackend, LookupValue, Table};
use crate::error::{AppError, AppResult};

/// PostgreSQL database backend implementation
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Count all rows of a table
    pub(crate) async fn count_rows(&self, table: Table) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_database_error(e, &format!("Failed to count {}", table.as_str())))
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&config.connection_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("PostgreSQL health check failed: {}", e)))?;
        Ok(())
    }

    async fn init_schema(&self) -> AppResult<()> {
        schema::init_schema(&self.pool).await
    }

    async fn cleanup(&self) -> AppResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl LookupBackend for PostgresBackend {
    async fn value_exists(
        &self,
        table: Table,
        column: &'static str,
        value: LookupValue<'_>,
        ignore_id: Option<i64>,
    ) -> AppResult<bool> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM {} WHERE ", table.as_str()));

        match value {
            LookupValue::Text(text) => {
                query.push(format!("LOWER({}) = LOWER(", column));
                query.push_bind(text.to_string());
                query.push(")");
            }
            LookupValue::Integer(number) => {
                query.push(format!("{} = ", column));
                query.push_bind(number);
            }
        }

        if let Some(id) = ignore_id {
            query.push(" AND id <> ");
            query.push_bind(id);
        }

        let count: i64 = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "Failed to look up value"))?;

        Ok(count > 0)
    }
}
