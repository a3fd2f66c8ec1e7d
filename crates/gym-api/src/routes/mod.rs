//! Route definitions
//!
//! API routes mounted under /api/v1; health probes stay at the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, invoices, members, services};
use crate::state::AppState;

/// Create the main API router (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(member_routes())
        .merge(invoice_routes())
        .merge(service_routes())
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/members", post(members::enroll_member))
        .route("/members/:member_id", get(members::get_member))
        .route("/members/:member_id/services", get(members::list_member_services))
        .route("/members/:member_id/freezes", get(members::list_member_freezes))
}

fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", post(invoices::create_invoice))
        .route("/invoices/:invoice_id", get(invoices::get_invoice))
        .route("/invoices/:invoice_id/payments", post(invoices::record_payment))
}

/// Ledger operations on invoice items
fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/services/change-date", post(services::change_date))
        .route("/services/freeze", post(services::freeze))
}
