use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

/// Initialize the directory schema for SQLite
///
/// Creates departments, users, units and locations with their foreign keys.
/// Deleting a department detaches its users and removes its units.
pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    let tables = [
        (
            "departments",
            r#"
            CREATE TABLE IF NOT EXISTS departments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        ),
        (
            "users",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                password TEXT NOT NULL,
                department_id INTEGER REFERENCES departments (id) ON DELETE SET NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        ),
        (
            "units",
            r#"
            CREATE TABLE IF NOT EXISTS units (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                department_id INTEGER NOT NULL REFERENCES departments (id) ON DELETE CASCADE,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        ),
        (
            "locations",
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                location TEXT NOT NULL,
                zone TEXT NOT NULL,
                state TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            "#,
        ),
    ];

    for (name, sql) in tables {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create {} table: {}", name, e)))?;
    }

    create_indexes(pool).await
}

async fn create_indexes(pool: &SqlitePool) -> AppResult<()> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users (LOWER(email))",
        "CREATE INDEX IF NOT EXISTS idx_users_department_id ON users (department_id)",
        "CREATE INDEX IF NOT EXISTS idx_units_department_id ON units (department_id)",
        "CREATE INDEX IF NOT EXISTS idx_departments_name ON departments (LOWER(name))",
    ];

    for sql in indexes {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}

/// Drop the directory schema (for cleanup/testing)
#[cfg(test)]
pub async fn drop_schema(pool: &SqlitePool) -> AppResult<()> {
    // Reverse order due to foreign key constraints
    for table in ["locations", "units", "users", "departments"] {
        let sql = format!("DROP TABLE IF EXISTS {}", table);
        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to drop table {}: {}", table, e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_schema_creation() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        init_schema(&pool).await.unwrap();
        // Running twice must be harmless
        init_schema(&pool).await.unwrap();

        for table in ["users", "departments", "units", "locations"] {
            let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count.0, 0);
        }

        drop_schema(&pool).await.unwrap();
    }
}
