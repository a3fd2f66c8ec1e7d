//! Redis-backed idempotency store
//!
//! A key is claimed with `SET NX EX`, so exactly one request across all
//! server instances wins it. The claim lives only for the pending TTL;
//! `complete` rewrites it with the replay TTL.

use async_trait::async_trait;
use gym_core::traits::{IdempotencyStore, RepoResult, Reservation};
use serde_json::Value;
use tracing::debug;

use super::IdempotencyRecord;
use crate::pool::RedisPool;

/// Namespace for idempotency keys in Redis
pub const IDEMPOTENCY_KEY_PREFIX: &str = "gym:idempotency:";

#[derive(Clone)]
pub struct RedisIdempotencyStore {
    pool: RedisPool,
}

impl RedisIdempotencyStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn redis_key(key: &str) -> String {
        format!("{IDEMPOTENCY_KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn reserve(
        &self,
        key: &str,
        fingerprint: &str,
        pending_ttl_seconds: u64,
    ) -> RepoResult<Reservation> {
        let redis_key = Self::redis_key(key);
        if self
            .pool
            .claim_json(
                &redis_key,
                &IdempotencyRecord::pending(fingerprint),
                pending_ttl_seconds,
            )
            .await?
        {
            debug!(key, "Idempotency key acquired");
            return Ok(Reservation::Acquired);
        }

        // Lost the race; whoever holds it decides. A key that expired in
        // between is reported in flight and the client retries.
        let existing = self.pool.load_json::<IdempotencyRecord>(&redis_key).await?;
        Ok(existing.map_or(Reservation::InFlight, |record| {
            record.as_reservation(fingerprint)
        }))
    }

    async fn complete(
        &self,
        key: &str,
        fingerprint: &str,
        response: &Value,
        ttl_seconds: u64,
    ) -> RepoResult<()> {
        let record = IdempotencyRecord::completed(fingerprint, response);
        self.pool
            .store_json(&Self::redis_key(key), &record, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn release(&self, key: &str) -> RepoResult<()> {
        self.pool.remove(&Self::redis_key(key)).await?;
        Ok(())
    }
}
