//! Schema migrations.

use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// Applies the SQL files in the crate's `migrations/` directory.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), DatabaseError> {
    let migrations_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir.as_path()).await?;
    migrator.run(pool).await?;
    Ok(())
}
