//! Redis connection pool (deadpool-redis) with the few JSON commands the
//! ledger needs: claim-if-absent, overwrite, load and remove, all with TTLs.

use deadpool_redis::{Config, Connection, Pool, Runtime};
use gym_core::DomainError;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_POOL_SIZE: usize = 16;

#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// e.g. `redis://localhost:6379`
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            max_connections: DEFAULT_POOL_SIZE,
        }
    }
}

impl From<&gym_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &gym_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

impl RedisPoolConfig {
    /// URL without the `user:password@` part, for logs
    fn redacted_url(&self) -> &str {
        self.url
            .rsplit_once('@')
            .map_or(self.url.as_str(), |(_, host)| host)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("No Redis connection available: {0}")]
    Checkout(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// Every cache failure is an infrastructure failure to the ledger
impl From<RedisPoolError> for DomainError {
    fn from(err: RedisPoolError) -> Self {
        DomainError::CacheError(err.to_string())
    }
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map(|builder| {
                builder
                    .max_size(config.max_connections)
                    .runtime(Runtime::Tokio1)
            })
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        tracing::info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            "Redis pool ready"
        );

        Ok(Self { pool })
    }

    pub fn from_config(config: &gym_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    pub async fn connection(&self) -> RedisResult<Connection> {
        Ok(self.pool.get().await?)
    }

    /// Round-trip a `PING`; the readiness probe's cache check
    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// `SET key json NX EX ttl`; true when this caller now owns the key
    pub async fn claim_json<V: Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl_seconds: u64,
    ) -> RedisResult<bool> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    /// `SET key json EX ttl`, replacing whatever was there
    pub async fn store_json<V: Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl_seconds: u64,
    ) -> RedisResult<()> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, ttl_seconds).await?;
        Ok(())
    }

    pub async fn load_json<V: DeserializeOwned>(&self, key: &str) -> RedisResult<Option<V>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|payload| serde_json::from_str(&payload))
            .transpose()
            .map_err(RedisPoolError::from)
    }

    /// True when the key existed
    pub async fn remove(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.connection().await?;
        let removed: u32 = conn.del(key).await?;
        Ok(removed > 0)
    }
}
