//! Path parameter extractors
//!
//! Snowflake IDs arrive as decimal strings in the path.

use gym_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// Path parameters with member_id
#[derive(Debug, Deserialize)]
pub struct MemberIdPath {
    pub member_id: String,
}

impl MemberIdPath {
    /// Parse member_id as Snowflake
    pub fn member_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.member_id, "member_id")
    }
}

/// Path parameters with invoice_id
#[derive(Debug, Deserialize)]
pub struct InvoiceIdPath {
    pub invoice_id: String,
}

impl InvoiceIdPath {
    /// Parse invoice_id as Snowflake
    pub fn invoice_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.invoice_id, "invoice_id")
    }
}
