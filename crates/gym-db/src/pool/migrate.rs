//! Runtime schema migrations
//!
//! SQLx is built without its macros, so migrations are read from disk at
//! startup instead of being embedded with `migrate!`.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use std::path::Path;
use tracing::info;

/// Directory holding the `NNNN_name.sql` migration files
pub const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

/// Apply every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let migrator = Migrator::new(Path::new(MIGRATIONS_DIR)).await?;
    migrator.run(pool).await?;
    info!(count = migrator.iter().count(), "Database migrations applied");
    Ok(())
}
