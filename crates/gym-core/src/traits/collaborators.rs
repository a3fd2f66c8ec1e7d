//! Notification and request-dedup collaborators

use async_trait::async_trait;
use serde_json::Value;

use crate::events::DomainEvent;
use crate::traits::RepoResult;

/// Fan-out of ledger events to whoever listens (front desk, audit)
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> RepoResult<()>;
}

/// Outcome of claiming an idempotency key
#[derive(Debug, Clone, PartialEq)]
pub enum Reservation {
    /// The caller owns the key and must `complete` or `release` it
    Acquired,
    /// Another request holds the key and has not finished
    InFlight,
    /// A request with this key already finished; replay its response
    Completed(Value),
    /// The key belongs to a request with a different body
    Mismatch,
}

/// At-most-once guard for client-keyed requests
///
/// `fingerprint` identifies the request body a key was first used with; a
/// later request presenting the same key with another fingerprint gets
/// [`Reservation::Mismatch`].
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Claim `key` for `pending_ttl_seconds`, long enough to finish one request
    async fn reserve(
        &self,
        key: &str,
        fingerprint: &str,
        pending_ttl_seconds: u64,
    ) -> RepoResult<Reservation>;

    /// Store the response for replay, kept for `ttl_seconds`
    async fn complete(
        &self,
        key: &str,
        fingerprint: &str,
        response: &Value,
        ttl_seconds: u64,
    ) -> RepoResult<()>;

    /// Drop a reservation whose request failed so the client can retry
    async fn release(&self, key: &str) -> RepoResult<()>;
}
