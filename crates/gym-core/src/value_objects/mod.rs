//! Value objects - immutable domain primitives

mod freeze_budget;
mod snowflake;

pub use freeze_budget::{FreezeBudget, FREEZE_DAY_BUDGET};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
