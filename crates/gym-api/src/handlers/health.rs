//! Health check handlers
//!
//! Endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use gym_service::dto::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// Basic health check (liveness probe)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness check with dependency health
///
/// GET /health/ready
///
/// A backend without a pool (the in-memory store) has nothing to probe.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let ctx = state.service_context();

    let storage_healthy = match ctx.pool() {
        Some(pool) => gym_db::ping(pool).await,
        None => true,
    };

    let cache_healthy = match ctx.redis_pool() {
        Some(redis) => redis.ping().await.is_ok(),
        None => true,
    };

    let response = ReadinessResponse::ready(storage_healthy, cache_healthy);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
