//! Middleware stack for the API server
//!
//! Provides request IDs, tracing, timeouts, compression, CORS and rate
//! limiting.

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use gym_common::{CorsConfig, RateLimitConfig};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::extractors::{IDEMPOTENCY_KEY_HEADER, STAFF_ID_HEADER};
use crate::state::AppState;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Apply the common stack: request ID, tracing, timeout, compression
pub fn apply_middleware(router: Router<AppState>) -> Router<AppState> {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(
                HeaderName::from_static(REQUEST_ID_HEADER),
                MakeRequestUuid,
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                REQUEST_ID_HEADER,
            )))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(REQUEST_ID_HEADER)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");

                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    })
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            // Timeout (returns 503 Service Unavailable on timeout)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::SERVICE_UNAVAILABLE,
                REQUEST_TIMEOUT,
            ))
            .layer(CompressionLayer::new()),
    )
}

/// Apply the full stack with configured CORS and rate limiting
///
/// Layers wrap inside-out, so a request passes rate limiting first, then
/// request ID, tracing, timeout, and CORS before reaching the handler.
pub fn apply_middleware_with_config(
    router: Router<AppState>,
    rate_limit_config: &RateLimitConfig,
    cors_config: &CorsConfig,
    is_production: bool,
) -> Router<AppState> {
    let router = apply_middleware(router.layer(create_cors_layer(cors_config, is_production)));

    // Global key: one bucket for the whole server
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rate_limit_config.requests_per_second.into())
        .burst_size(rate_limit_config.burst)
        .key_extractor(GlobalKeyExtractor)
        .finish();

    match governor_conf {
        Some(config) => router.layer(GovernorLayer {
            config: Arc::new(config),
        }),
        None => {
            tracing::warn!(
                requests_per_second = rate_limit_config.requests_per_second,
                burst = rate_limit_config.burst,
                "Invalid rate limit configuration, rate limiting disabled"
            );
            router
        }
    }
}

/// Origins a browser may call from
///
/// Configured origins always win. Without any, production allows none and
/// development allows all.
fn allowed_origins(config: &CorsConfig, is_production: bool) -> AllowOrigin {
    if config.allowed_origins.is_empty() {
        if is_production {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; browser requests will be blocked");
            return AllowOrigin::list(Vec::<HeaderValue>::new());
        }
        tracing::warn!("CORS allows any origin; set CORS_ALLOWED_ORIGINS outside development");
        return AllowOrigin::from(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    tracing::info!(count = origins.len(), "CORS origins configured");
    AllowOrigin::list(origins)
}

/// Front-desk clients send the staff id and idempotency key as headers
fn create_cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id.clone(),
            HeaderName::from_static(STAFF_ID_HEADER),
            HeaderName::from_static(IDEMPOTENCY_KEY_HEADER),
        ])
        .expose_headers([request_id])
        .allow_origin(allowed_origins(config, is_production))
}
