//! Database Module
//!
//! Handles SQLite connection pool, migrations and the one-time status
//! alias cleanup.

pub mod repository;

use crate::utils::AppError;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

/// Embedded migrations, shared with the integration tests.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Database service — owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Create a new database service with WAL mode
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Build connection options: WAL, foreign keys, normal sync
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        // busy_timeout: wait 5s on write contention instead of failing
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set busy_timeout: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        // Run migrations (ignore previously applied but now removed migrations)
        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        // One-time cleanup: remap historic status aliases to canonical values
        migrate_status_aliases(&pool)
            .await
            .map_err(|e| AppError::database(format!("Status alias migration failed: {e}")))?;

        Ok(Self { pool })
    }
}

/// Remap free-form status aliases left behind by older data
/// ("in-progress" vs "in_progress") so the status enum stays strict.
pub async fn migrate_status_aliases(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let result =
        sqlx::query("UPDATE service_request SET status = 'in_progress' WHERE status = 'in-progress'")
            .execute(pool)
            .await?;
    if result.rows_affected() > 0 {
        tracing::info!(
            rows = result.rows_affected(),
            "Migrated legacy 'in-progress' status alias"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_database_and_applies_migrations() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("portal.db");
        let db = DbService::new(path.to_str().unwrap()).await.unwrap();

        // Seed migration leaves the catalog non-empty
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM service")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert!(count > 0);
    }

    #[tokio::test]
    async fn remaps_legacy_status_alias() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("portal.db");
        let db = DbService::new(path.to_str().unwrap()).await.unwrap();

        sqlx::query(
            "INSERT INTO service_request (id, owner_id, service_id, status, progress, created_at, updated_at) VALUES (1, 42, 1, 'in-progress', 10, 0, 0)",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        migrate_status_aliases(&db.pool).await.unwrap();

        let (status,): (String,) =
            sqlx::query_as("SELECT status FROM service_request WHERE id = 1")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(status, "in_progress");
    }
}
