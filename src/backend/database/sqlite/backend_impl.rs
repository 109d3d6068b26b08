use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use super::super::config::DatabaseBackendConfig;
use super::super::{map_database_error, ACQUIRE_TIMEOUT};
use super::schema;
use crate::backend::{Backend, LookupBackend, LookupValue, Table};
use crate::error::{AppError, AppResult};

/// SQLite database backend implementation
///
/// Used for the zero-config default (in-memory) and for single-node
/// deployments backed by a database file.
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the connection pool reference
    pub fn pool(&self) -> &SqlitePool {
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
impl Backend for SqliteBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config.validate()?;

        let url = if config.is_memory_database() {
            "sqlite::memory:"
        } else {
            config.connection_url.as_str()
        };

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT);

        if config.is_memory_database() {
            // Each connection to :memory: is its own database, so keep exactly one alive
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        Ok(Self::new(pool))
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("SQLite health check failed: {}", e)))?;
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
impl LookupBackend for SqliteBackend {
    async fn value_exists(
        &self,
        table: Table,
        column: &'static str,
        value: LookupValue<'_>,
        ignore_id: Option<i64>,
    ) -> AppResult<bool> {
        let mut query: QueryBuilder<Sqlite> =
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
