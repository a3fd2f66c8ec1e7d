//! Connection pool and schema management

mod migrate;
mod postgres;

pub use migrate::{run_migrations, MIGRATIONS_DIR};
pub use postgres::{create_pool, ping, DatabaseConfig};
pub use sqlx::postgres::PgPool;
