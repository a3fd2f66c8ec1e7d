//! # gym-db
//!
//! Storage layer implementing the `gym-core` repository traits.
//!
//! ## Overview
//!
//! - PostgreSQL via SQLx: connection pool, runtime migrations, `FromRow`
//!   models, entity mappers and repositories. Ledger writes run inside a
//!   transaction that row-locks what they touch.
//! - [`MemoryStore`]: a process-local implementation of the same traits,
//!   used for development and tests. Every write runs under one lock.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gym_db::{create_pool, run_migrations, DatabaseConfig, PgLedgerRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!     let ledger = PgLedgerRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, ping, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgInvoiceRepository, PgLedgerRepository, PgMemberRepository};
