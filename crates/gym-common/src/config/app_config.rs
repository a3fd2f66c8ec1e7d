//! Application configuration structs
//!
//! Loads configuration from environment variables, optionally seeded from a
//! `.env` file.

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub storage: StorageBackend,
    /// Present whenever `storage` is `Postgres`
    pub database: Option<DatabaseConfig>,
    /// Present whenever `storage` is `Postgres`
    pub redis: Option<RedisConfig>,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub idempotency: IdempotencyConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Where members, invoices and freezes are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL for records, Redis for events and idempotency keys
    #[default]
    Postgres,
    /// Process-local store; state is lost on restart
    Memory,
}

impl StorageBackend {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue("STORAGE_BACKEND", other.to_string())),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Lifetimes of `Idempotency-Key` records
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencyConfig {
    /// Replay window of a completed response
    #[serde(default = "default_idempotency_ttl")]
    pub ttl_seconds: u64,
    /// How long an unfinished claim blocks the key; outlives the request timeout
    #[serde(default = "default_idempotency_pending_ttl")]
    pub pending_ttl_seconds: u64,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_idempotency_ttl(),
            pending_ttl_seconds: default_idempotency_pending_ttl(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "gym-ledger".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_idempotency_ttl() -> u64 {
    86_400 // 24 hours
}

fn default_idempotency_pending_ttl() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(key)
                .map(|s| {
                    s.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue(key, s))
                })
                .transpose()
        };
        let narrowed = |key: &'static str, value: u64| -> Result<u32, ConfigError> {
            u32::try_from(value).map_err(|_| ConfigError::InvalidValue(key, value.to_string()))
        };

        let storage = lookup("STORAGE_BACKEND")
            .map(|s| StorageBackend::parse(&s))
            .transpose()?
            .unwrap_or_default();

        let port = parsed("API_PORT")?.ok_or(ConfigError::MissingVar("API_PORT"))?;
        let port = u16::try_from(port)
            .map_err(|_| ConfigError::InvalidValue("API_PORT", port.to_string()))?;

        let (database, redis) = match storage {
            StorageBackend::Memory => (None, None),
            StorageBackend::Postgres => {
                let database = DatabaseConfig {
                    url: lookup("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                    max_connections: match parsed("DATABASE_MAX_CONNECTIONS")? {
                        Some(v) => narrowed("DATABASE_MAX_CONNECTIONS", v)?,
                        None => default_max_connections(),
                    },
                    min_connections: match parsed("DATABASE_MIN_CONNECTIONS")? {
                        Some(v) => narrowed("DATABASE_MIN_CONNECTIONS", v)?,
                        None => default_min_connections(),
                    },
                };
                let redis = RedisConfig {
                    url: lookup("REDIS_URL").ok_or(ConfigError::MissingVar("REDIS_URL"))?,
                    max_connections: match parsed("REDIS_MAX_CONNECTIONS")? {
                        Some(v) => narrowed("REDIS_MAX_CONNECTIONS", v)?,
                        None => default_redis_max_connections(),
                    },
                };
                (Some(database), Some(redis))
            }
        };

        let worker_id = match parsed("WORKER_ID")? {
            Some(v) if v < 1024 => v as u16,
            Some(v) => return Err(ConfigError::InvalidValue("WORKER_ID", v.to_string())),
            None => 0,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(default_host),
                port,
            },
            storage,
            database,
            redis,
            rate_limit: RateLimitConfig {
                requests_per_second: match parsed("RATE_LIMIT_REQUESTS_PER_SECOND")? {
                    Some(v) => narrowed("RATE_LIMIT_REQUESTS_PER_SECOND", v)?,
                    None => default_requests_per_second(),
                },
                burst: match parsed("RATE_LIMIT_BURST")? {
                    Some(v) => narrowed("RATE_LIMIT_BURST", v)?,
                    None => default_burst(),
                },
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig { worker_id },
            idempotency: IdempotencyConfig {
                ttl_seconds: parsed("IDEMPOTENCY_TTL_SECONDS")?
                    .unwrap_or_else(default_idempotency_ttl),
                pending_ttl_seconds: parsed("IDEMPOTENCY_PENDING_TTL_SECONDS")?
                    .unwrap_or_else(default_idempotency_pending_ttl),
            },
        })
    }

    /// Configuration for an in-memory server on the given port
    #[must_use]
    pub fn in_memory(port: u16) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
            },
            api: ServerConfig {
                host: default_host(),
                port,
            },
            storage: StorageBackend::Memory,
            database: None,
            redis: None,
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
            snowflake: SnowflakeConfig::default(),
            idempotency: IdempotencyConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_memory_backend_needs_no_urls() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("API_PORT", "3000"), ("STORAGE_BACKEND", "memory")]))
                .unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.database.is_none());
        assert!(config.redis.is_none());
        assert_eq!(config.idempotency.ttl_seconds, 86_400);
        assert_eq!(config.idempotency.pending_ttl_seconds, 60);
        assert_eq!(config.app.name, "gym-ledger");
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[("API_PORT", "3000")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_postgres_backend_full() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("API_PORT", "8080"),
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://localhost/gym"),
            ("DATABASE_MAX_CONNECTIONS", "40"),
            ("REDIS_URL", "redis://localhost"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("WORKER_ID", "7"),
            ("IDEMPOTENCY_TTL_SECONDS", "600"),
            ("IDEMPOTENCY_PENDING_TTL_SECONDS", "45"),
        ]))
        .unwrap();

        assert!(config.app.env.is_production());
        let db = config.database.unwrap();
        assert_eq!(db.max_connections, 40);
        assert_eq!(db.min_connections, 5);
        assert_eq!(config.redis.unwrap().max_connections, 10);
        assert_eq!(config.cors.allowed_origins.len(), 2);
        assert_eq!(config.snowflake.worker_id, 7);
        assert_eq!(config.idempotency.ttl_seconds, 600);
        assert_eq!(config.idempotency.pending_ttl_seconds, 45);
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup_from(&[("API_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("API_PORT", _)));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("API_PORT", "3000"),
            ("STORAGE_BACKEND", "mongo"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("STORAGE_BACKEND", _)));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("API_PORT", "3000"),
            ("STORAGE_BACKEND", "memory"),
            ("WORKER_ID", "2048"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("WORKER_ID", _)));
    }
}
