mod models;

pub use models::*;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    let db_path = data_dir.join("stockr.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: Users table
    execute_sql(pool, include_str!("../../migrations/001_users.sql")).await?;

    // Migration 002: Products table
    execute_sql(pool, include_str!("../../migrations/002_products.sql")).await?;

    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_enforces_unique_email() {
        tokio_test::block_on(async {
            let dir = std::env::temp_dir().join(format!("stockr-test-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&dir).unwrap();

            let pool = init(&dir).await.unwrap();

            sqlx::query(
                "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind("u1")
            .bind("Ama")
            .bind("ama@example.com")
            .bind("hash")
            .bind("Assistant")
            .bind("2025-01-01T00:00:00Z")
            .bind("2025-01-01T00:00:00Z")
            .execute(&pool)
            .await
            .unwrap();

            // the constraint, not the handler pre-check, arbitrates duplicates
            let duplicate = sqlx::query(
                "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind("u2")
            .bind("Kofi")
            .bind("ama@example.com")
            .bind("hash")
            .bind("Shopkeeper")
            .bind("2025-01-01T00:00:00Z")
            .bind("2025-01-01T00:00:00Z")
            .execute(&pool)
            .await;

            let err = duplicate.unwrap_err().to_string();
            assert!(err.contains("UNIQUE constraint failed"), "got: {}", err);

            pool.close().await;
            let _ = std::fs::remove_dir_all(&dir);
        });
    }
}
