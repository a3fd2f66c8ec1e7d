//! Service context - dependency container for services
//!
//! Holds the repositories, collaborators and ID generator a request needs.

use std::sync::Arc;

use gym_cache::{LoggingEventPublisher, MemoryIdempotencyStore, RedisPool};
use gym_core::traits::{
    EventPublisher, IdempotencyStore, InvoiceRepository, LedgerRepository, MemberRepository,
};
use gym_core::{Snowflake, SnowflakeGenerator};
use gym_db::{MemoryStore, PgPool};

use super::error::{ServiceError, ServiceResult};

const DEFAULT_IDEMPOTENCY_TTL_SECONDS: u64 = 86_400;
const DEFAULT_IDEMPOTENCY_PENDING_TTL_SECONDS: u64 = 60;

/// Service context containing all dependencies
///
/// Pools are only present for the backends that use them; readiness probes
/// treat an absent pool as nothing to check.
#[derive(Clone)]
pub struct ServiceContext {
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,

    // Repositories
    member_repo: Arc<dyn MemberRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
    ledger_repo: Arc<dyn LedgerRepository>,

    // Collaborators
    events: Arc<dyn EventPublisher>,
    idempotency: Arc<dyn IdempotencyStore>,
    idempotency_ttl_seconds: u64,
    idempotency_pending_ttl_seconds: u64,

    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    /// Everything in process memory: one [`MemoryStore`] behind all three
    /// repositories, a DashMap idempotency store and log-only events
    pub fn in_memory(worker_id: u16) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            pool: None,
            redis_pool: None,
            member_repo: store.clone(),
            invoice_repo: store.clone(),
            ledger_repo: store,
            events: Arc::new(LoggingEventPublisher),
            idempotency: Arc::new(MemoryIdempotencyStore::new()),
            idempotency_ttl_seconds: DEFAULT_IDEMPOTENCY_TTL_SECONDS,
            idempotency_pending_ttl_seconds: DEFAULT_IDEMPOTENCY_PENDING_TTL_SECONDS,
            snowflake_generator: Arc::new(SnowflakeGenerator::new(worker_id)),
        }
    }

    /// Get the PostgreSQL connection pool, if this context uses one
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Get the Redis connection pool, if this context uses one
    pub fn redis_pool(&self) -> Option<&RedisPool> {
        self.redis_pool.as_ref()
    }

    // === Repositories ===

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    pub fn invoice_repo(&self) -> &dyn InvoiceRepository {
        self.invoice_repo.as_ref()
    }

    pub fn ledger_repo(&self) -> &dyn LedgerRepository {
        self.ledger_repo.as_ref()
    }

    // === Collaborators ===

    pub fn events(&self) -> &dyn EventPublisher {
        self.events.as_ref()
    }

    pub fn idempotency(&self) -> &dyn IdempotencyStore {
        self.idempotency.as_ref()
    }

    /// How long a completed idempotent response is replayed
    pub fn idempotency_ttl_seconds(&self) -> u64 {
        self.idempotency_ttl_seconds
    }

    /// How long an unfinished idempotent request holds its key
    pub fn idempotency_pending_ttl_seconds(&self) -> u64 {
        self.idempotency_pending_ttl_seconds.min(self.idempotency_ttl_seconds)
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("redis_pool", &self.redis_pool.as_ref().map(|_| "RedisPool"))
            .field("repositories", &"...")
            .field("idempotency_ttl_seconds", &self.idempotency_ttl_seconds)
            .field(
                "idempotency_pending_ttl_seconds",
                &self.idempotency_pending_ttl_seconds,
            )
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    invoice_repo: Option<Arc<dyn InvoiceRepository>>,
    ledger_repo: Option<Arc<dyn LedgerRepository>>,
    events: Option<Arc<dyn EventPublisher>>,
    idempotency: Option<Arc<dyn IdempotencyStore>>,
    idempotency_ttl_seconds: Option<u64>,
    idempotency_pending_ttl_seconds: Option<u64>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: RedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn invoice_repo(mut self, repo: Arc<dyn InvoiceRepository>) -> Self {
        self.invoice_repo = Some(repo);
        self
    }

    pub fn ledger_repo(mut self, repo: Arc<dyn LedgerRepository>) -> Self {
        self.ledger_repo = Some(repo);
        self
    }

    pub fn events(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(publisher);
        self
    }

    pub fn idempotency(mut self, store: Arc<dyn IdempotencyStore>) -> Self {
        self.idempotency = Some(store);
        self
    }

    pub fn idempotency_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.idempotency_ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn idempotency_pending_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.idempotency_pending_ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// Events default to the log-only publisher.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a repository or the idempotency
    /// store is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            pool: self.pool,
            redis_pool: self.redis_pool,
            member_repo: self
                .member_repo
                .ok_or_else(|| ServiceError::validation("member_repo is required"))?,
            invoice_repo: self
                .invoice_repo
                .ok_or_else(|| ServiceError::validation("invoice_repo is required"))?,
            ledger_repo: self
                .ledger_repo
                .ok_or_else(|| ServiceError::validation("ledger_repo is required"))?,
            events: self
                .events
                .unwrap_or_else(|| Arc::new(LoggingEventPublisher)),
            idempotency: self
                .idempotency
                .ok_or_else(|| ServiceError::validation("idempotency store is required"))?,
            idempotency_ttl_seconds: self
                .idempotency_ttl_seconds
                .unwrap_or(DEFAULT_IDEMPOTENCY_TTL_SECONDS),
            idempotency_pending_ttl_seconds: self
                .idempotency_pending_ttl_seconds
                .unwrap_or(DEFAULT_IDEMPOTENCY_PENDING_TTL_SECONDS),
            snowflake_generator: self.snowflake_generator.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_repositories() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_builder_defaults() {
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContextBuilder::new()
            .member_repo(store.clone())
            .invoice_repo(store.clone())
            .ledger_repo(store)
            .idempotency(Arc::new(MemoryIdempotencyStore::new()))
            .build()
            .unwrap();

        assert_eq!(ctx.idempotency_ttl_seconds(), 86_400);
        assert_eq!(ctx.idempotency_pending_ttl_seconds(), 60);
        assert!(ctx.pool().is_none());
        assert_ne!(ctx.generate_id(), ctx.generate_id());
    }

    #[test]
    fn test_pending_claim_never_outlives_replay_window() {
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContextBuilder::new()
            .member_repo(store.clone())
            .invoice_repo(store.clone())
            .ledger_repo(store)
            .idempotency(Arc::new(MemoryIdempotencyStore::new()))
            .idempotency_ttl_seconds(20)
            .idempotency_pending_ttl_seconds(60)
            .build()
            .unwrap();

        assert_eq!(ctx.idempotency_pending_ttl_seconds(), 20);
    }
}
