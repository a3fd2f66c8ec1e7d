//! In-process collaborators for running without Redis

mod idempotency;
mod logging_publisher;

pub use idempotency::MemoryIdempotencyStore;
pub use logging_publisher::LoggingEventPublisher;
