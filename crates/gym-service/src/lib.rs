//! # gym-service
//!
//! Application layer: the ledger, member and invoice use cases, their DTOs,
//! and the service context that wires repositories and collaborators.

pub mod dto;
pub mod services;

pub use services::{
    InvoiceService, LedgerService, MemberService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
