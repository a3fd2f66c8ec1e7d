//! Invoice entity <-> model mapper

use gym_core::entities::{Invoice, InvoiceItem, InvoiceStatus};
use gym_core::error::DomainError;
use gym_core::value_objects::Snowflake;
use sqlx::types::Json;

use super::corrupt;
use crate::models::InvoiceModel;

impl TryFrom<InvoiceModel> for Invoice {
    type Error = DomainError;

    fn try_from(model: InvoiceModel) -> Result<Self, Self::Error> {
        let status = InvoiceStatus::parse(&model.status)
            .map_err(|_| corrupt("invoices.status", &model.status))?;

        Ok(Invoice {
            id: Snowflake::new(model.id),
            invoice_number: model.invoice_number,
            member_id: Snowflake::new(model.member_id),
            status,
            total: model.total,
            total_paid: model.total_paid,
            items: model.items.0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Invoice entity prepared for insertion
pub struct InvoiceInsert<'a> {
    pub id: i64,
    pub invoice_number: &'a str,
    pub member_id: i64,
    pub status: &'static str,
    pub total: i64,
    pub total_paid: i64,
    pub items: Json<&'a [InvoiceItem]>,
}

impl<'a> InvoiceInsert<'a> {
    pub fn new(invoice: &'a Invoice) -> Self {
        Self {
            id: invoice.id.into_inner(),
            invoice_number: &invoice.invoice_number,
            member_id: invoice.member_id.into_inner(),
            status: invoice.status.as_str(),
            total: invoice.total,
            total_paid: invoice.total_paid,
            items: Json(invoice.items.as_slice()),
        }
    }
}
