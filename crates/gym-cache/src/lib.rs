//! # gym-cache
//!
//! Redis-backed collaborators for the ledger, plus in-process stand-ins.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: Ledger events fanned out per member and on a firehose channel
//! - **Idempotency**: `SET NX EX` reservations for client-keyed requests
//! - **Local**: DashMap idempotency store and a log-only event publisher for
//!   running without Redis
//!
//! ## Example
//!
//! ```ignore
//! use gym_cache::{RedisEventPublisher, RedisIdempotencyStore, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let events = RedisEventPublisher::new(pool.clone());
//! let idempotency = RedisIdempotencyStore::new(pool);
//! ```

pub mod idempotency;
pub mod local;
pub mod pool;
pub mod pubsub;

pub use idempotency::{IdempotencyRecord, RedisIdempotencyStore, IDEMPOTENCY_KEY_PREFIX};
pub use local::{LoggingEventPublisher, MemoryIdempotencyStore};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use pubsub::{
    PubSubChannel, PubSubEvent, Publisher, RedisEventPublisher, LEDGER_CHANNEL,
    MEMBER_CHANNEL_PREFIX,
};
