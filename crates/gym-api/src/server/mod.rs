//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use gym_cache::{
    LoggingEventPublisher, MemoryIdempotencyStore, RedisEventPublisher, RedisIdempotencyStore,
    RedisPool,
};
use gym_common::{AppConfig, AppError, StorageBackend};
use gym_core::SnowflakeGenerator;
use gym_db::{
    create_pool, run_migrations, MemoryStore, PgInvoiceRepository, PgLedgerRepository,
    PgMemberRepository,
};
use gym_service::{ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// How often the in-memory idempotency store drops expired keys
const IDEMPOTENCY_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the complete Axum application with all routes and middleware
///
/// Health probes sit outside the rate limiter.
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );

    Router::new()
        .merge(health_routes())
        .merge(api)
        .with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let builder = ServiceContextBuilder::new()
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .idempotency_ttl_seconds(config.idempotency.ttl_seconds)
        .idempotency_pending_ttl_seconds(config.idempotency.pending_ttl_seconds);

    let service_context = match config.storage {
        StorageBackend::Memory => memory_context(builder)?,
        StorageBackend::Postgres => postgres_context(builder, &config).await?,
    };

    Ok(AppState::new(service_context, config))
}

fn memory_context(builder: ServiceContextBuilder) -> Result<ServiceContext, AppError> {
    warn!("Using in-memory storage; records are lost on restart");
    let store = Arc::new(MemoryStore::new());
    let idempotency = Arc::new(MemoryIdempotencyStore::new());
    idempotency.spawn_sweeper(IDEMPOTENCY_SWEEP_INTERVAL);

    builder
        .member_repo(store.clone())
        .invoice_repo(store.clone())
        .ledger_repo(store)
        .events(Arc::new(LoggingEventPublisher))
        .idempotency(idempotency)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))
}

async fn postgres_context(
    builder: ServiceContextBuilder,
    config: &AppConfig,
) -> Result<ServiceContext, AppError> {
    let database = config
        .database
        .as_ref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for postgres storage".into()))?;
    let redis = config
        .redis
        .as_ref()
        .ok_or_else(|| AppError::Config("REDIS_URL is required for postgres storage".into()))?;

    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&gym_db::DatabaseConfig::from(database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established, migrations applied");

    info!("Connecting to Redis...");
    let redis_pool = RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis pool created");

    builder
        .pool(pool.clone())
        .redis_pool(redis_pool.clone())
        .member_repo(Arc::new(PgMemberRepository::new(pool.clone())))
        .invoice_repo(Arc::new(PgInvoiceRepository::new(pool.clone())))
        .ledger_repo(Arc::new(PgLedgerRepository::new(pool)))
        .events(Arc::new(RedisEventPublisher::new(redis_pool.clone())))
        .idempotency(Arc::new(RedisIdempotencyStore::new(redis_pool)))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API_HOST/API_PORT: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
