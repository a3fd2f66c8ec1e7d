//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod de;
pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    ChangeDateRequest, CreateInvoiceRequest, EnrollMemberRequest, FreezeRequest,
    InvoiceItemRequest, PlanRequest, RecordPaymentRequest,
};

pub use responses::{
    FreezeBudgetResponse, FreezeRecordResponse, FreezeResponse, HealthChecks,
    HealthResponse, InvoiceItemResponse, InvoiceResponse, MemberResponse, PlanResponse,
    ReadinessResponse, ServiceResponse,
};
