//! Redis Pub/Sub module.
//!
//! Ledger events are published for front-desk screens and audit consumers.

mod channels;
mod publisher;

pub use channels::{PubSubChannel, LEDGER_CHANNEL, MEMBER_CHANNEL_PREFIX};
pub use publisher::{PubSubEvent, Publisher, RedisEventPublisher};
