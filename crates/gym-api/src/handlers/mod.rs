//! Route handlers
//!
//! All HTTP request handlers organized by resource.

pub mod health;
pub mod invoices;
pub mod members;
pub mod services;
