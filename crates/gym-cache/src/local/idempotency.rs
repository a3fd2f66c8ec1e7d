//! DashMap-backed idempotency store for a single process

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use gym_core::traits::{IdempotencyStore, RepoResult, Reservation};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;

use crate::idempotency::IdempotencyRecord;

/// Every this many reservations the map is swept of expired keys
const SWEEP_EVERY_RESERVATIONS: u64 = 256;

#[derive(Debug)]
struct Slot {
    record: IdempotencyRecord,
    expires_at: Instant,
}

impl Slot {
    fn new(record: IdempotencyRecord, ttl_seconds: u64) -> Self {
        Self {
            record,
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
        }
    }

    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Process-local [`IdempotencyStore`]
///
/// Expired keys are dropped on access, by a sweep every
/// `SWEEP_EVERY_RESERVATIONS` reservations, and by [`spawn_sweeper`] when
/// one is running.
///
/// [`spawn_sweeper`]: MemoryIdempotencyStore::spawn_sweeper
#[derive(Debug, Default)]
pub struct MemoryIdempotencyStore {
    slots: DashMap<String, Slot>,
    reservations: AtomicU64,
}

impl MemoryIdempotencyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held, expired ones included until swept
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop expired keys
    pub fn purge_expired(&self) {
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.is_live());
        let purged = before.saturating_sub(self.slots.len());
        if purged > 0 {
            debug!(purged, "Purged expired idempotency keys");
        }
    }

    /// Purge expired keys every `period` until the store is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticks = interval(period);
            loop {
                ticks.tick().await;
                let Some(live) = store.upgrade() else {
                    break;
                };
                live.purge_expired();
            }
        })
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn reserve(
        &self,
        key: &str,
        fingerprint: &str,
        pending_ttl_seconds: u64,
    ) -> RepoResult<Reservation> {
        // retain() takes every shard lock, so sweep before holding an entry
        let seen = self.reservations.fetch_add(1, Ordering::Relaxed) + 1;
        if seen % SWEEP_EVERY_RESERVATIONS == 0 {
            self.purge_expired();
        }

        // The entry holds the shard lock, so check-and-claim is atomic
        let claim = Slot::new(IdempotencyRecord::pending(fingerprint), pending_ttl_seconds);
        match self.slots.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live() {
                    Ok(occupied.get().record.as_reservation(fingerprint))
                } else {
                    occupied.insert(claim);
                    Ok(Reservation::Acquired)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(claim);
                Ok(Reservation::Acquired)
            }
        }
    }

    async fn complete(
        &self,
        key: &str,
        fingerprint: &str,
        response: &Value,
        ttl_seconds: u64,
    ) -> RepoResult<()> {
        let record = IdempotencyRecord::completed(fingerprint, response);
        self.slots
            .insert(key.to_string(), Slot::new(record, ttl_seconds));
        Ok(())
    }

    async fn release(&self, key: &str) -> RepoResult<()> {
        self.slots.remove(key);
        Ok(())
    }
}
