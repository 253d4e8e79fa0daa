//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled for concurrent access
//! - Automatic database file creation

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use sqlx::{Pool, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;

/// Shared SQLite pool.
pub type DbPool = Arc<Pool<Sqlite>>;

/// Opens (creating if needed) the database at `db_path`.
///
/// The file is created when missing and WAL mode is enabled so an export can
/// read while a crawl is writing.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<DbPool, DatabaseError> {
    let db_path_str = db_path.to_string_lossy().to_string();
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(db_path)
    {
        Ok(_) => info!("Created database file {}", db_path_str),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Using existing database file {}", db_path_str)
        }
        Err(e) => {
            error!("Failed to create database file {}: {e}", db_path_str);
            return Err(DatabaseError::FileCreationError(e.to_string()));
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}", db_path_str))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(Arc::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cars.db");
        assert!(!path.exists());
        let pool = init_db_pool_with_path(&path).await.expect("pool");
        assert!(path.exists());
        pool.close().await;

        // Reopening an existing file is fine
        let pool = init_db_pool_with_path(&path).await.expect("reopen");
        pool.close().await;
    }

    #[tokio::test]
    async fn test_missing_parent_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("cars.db");
        let result = init_db_pool_with_path(&path).await;
        assert!(matches!(result, Err(DatabaseError::FileCreationError(_))));
    }
}
