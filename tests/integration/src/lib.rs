//! Integration test utilities for the ledger API
//!
//! Spawns the full Axum app on a local port (in-memory backend unless the
//! environment selects Postgres) and drives it over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
