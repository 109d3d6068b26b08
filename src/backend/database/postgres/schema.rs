use crate::error::{AppError, AppResult};
use sqlx::PgPool;

/// Initialize the directory schema for PostgreSQL
pub async fn init_schema(pool: &PgPool) -> AppResult<()> {
    let tables = [
        (
            "departments",
            r#"
            CREATE TABLE IF NOT EXISTS departments (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        ),
        (
            "users",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                password TEXT NOT NULL,
                department_id BIGINT REFERENCES departments (id) ON DELETE SET NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        ),
        (
            "units",
            r#"
            CREATE TABLE IF NOT EXISTS units (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                department_id BIGINT NOT NULL REFERENCES departments (id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        ),
        (
            "locations",
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                id BIGSERIAL PRIMARY KEY,
                location TEXT NOT NULL,
                zone TEXT NOT NULL,
                state TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
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
