//! Idempotency keys for at-most-once requests

mod record;
mod redis_store;

pub use record::IdempotencyRecord;
pub use redis_store::{RedisIdempotencyStore, IDEMPOTENCY_KEY_PREFIX};
