//! Invoice service
//!
//! Invoice creation, reads with per-item status, and payment recording.

use chrono::Utc;
use gym_core::entities::{Invoice, InvoiceItem};
use gym_core::events::{InvoiceCreatedEvent, PaymentRecordedEvent};
use gym_core::{DomainError, DomainEvent, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{CreateInvoiceRequest, InvoiceResponse, RecordPaymentRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Invoice service
pub struct InvoiceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InvoiceService<'a> {
    /// Create a new InvoiceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an invoice for an existing member
    #[instrument(skip(self, request), fields(invoice_number = %request.invoice_number))]
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> ServiceResult<InvoiceResponse> {
        let member_id = request.member_id;
        if self.ctx.member_repo().find_by_id(member_id).await?.is_none() {
            return Err(DomainError::MemberNotFound(member_id).into());
        }

        let items = request
            .items
            .into_iter()
            .map(|item| InvoiceItem {
                description: item.description,
                duration: item.duration,
                start_date: item.start_date,
                expiry_date: item.expiry_date,
            })
            .collect();

        let mut invoice = Invoice::new(
            self.ctx.generate_id(),
            request.invoice_number,
            member_id,
            request.total,
            items,
        );
        if let Some(status) = request.status {
            invoice = invoice.with_status(status);
        }
        invoice.validate()?;

        self.ctx.invoice_repo().create(&invoice).await?;

        info!(invoice_id = %invoice.id, member_id = %member_id, total = invoice.total, "Invoice created");

        self.publish(DomainEvent::InvoiceCreated(InvoiceCreatedEvent::new(
            invoice.id,
            member_id,
            invoice.total,
        )))
        .await;

        Ok(InvoiceResponse::at(&invoice, Utc::now()))
    }

    /// Get invoice by ID
    #[instrument(skip(self))]
    pub async fn get_invoice(&self, invoice_id: Snowflake) -> ServiceResult<InvoiceResponse> {
        let invoice = self
            .ctx
            .invoice_repo()
            .find_by_id(invoice_id)
            .await?
            .ok_or(DomainError::InvoiceNotFound(invoice_id))?;

        Ok(InvoiceResponse::at(&invoice, Utc::now()))
    }

    /// Add a payment; the invoice becomes `paid` once nothing is pending
    #[instrument(skip(self, request), fields(amount = request.amount))]
    pub async fn record_payment(
        &self,
        invoice_id: Snowflake,
        request: RecordPaymentRequest,
    ) -> ServiceResult<InvoiceResponse> {
        let invoice = self
            .ctx
            .invoice_repo()
            .record_payment(invoice_id, request.amount)
            .await?;

        info!(
            invoice_id = %invoice_id,
            pending = invoice.pending(),
            status = invoice.status.as_str(),
            "Payment recorded"
        );

        self.publish(DomainEvent::PaymentRecorded(PaymentRecordedEvent::new(
            invoice.id,
            invoice.member_id,
            request.amount,
            invoice.pending(),
        )))
        .await;

        Ok(InvoiceResponse::at(&invoice, Utc::now()))
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.ctx.events().publish(&event).await {
            warn!(error = %e, event_type = event.event_type(), "Failed to publish invoice event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::EnrollMemberRequest;
    use crate::services::MemberService;
    use gym_core::InvoiceStatus;
    use serde_json::json;

    async fn enrolled(ctx: &ServiceContext) -> String {
        let request: EnrollMemberRequest = serde_json::from_value(json!({
            "member_code": "GYM-7",
            "first_name": "Rui",
            "last_name": "Costa"
        }))
        .unwrap();
        MemberService::new(ctx).enroll(request).await.unwrap().id
    }

    fn invoice_request(member_id: &str, number: &str) -> CreateInvoiceRequest {
        serde_json::from_value(json!({
            "invoice_number": number,
            "member_id": member_id,
            "total": 9000,
            "items": [
                {"description": "Quarterly", "duration": "3 months",
                 "start_date": "2024-01-01", "expiry_date": "2024-03-31"}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_pay_invoice() {
        let ctx = ServiceContext::in_memory(1);
        let member_id = enrolled(&ctx).await;
        let service = InvoiceService::new(&ctx);

        let created = service
            .create_invoice(invoice_request(&member_id, "INV-1"))
            .await
            .unwrap();
        assert_eq!(created.status, InvoiceStatus::Draft);
        assert_eq!(created.pending, 9000);

        let id = Snowflake::parse(&created.id).unwrap();
        let partial = service
            .record_payment(id, RecordPaymentRequest { amount: 4000 })
            .await
            .unwrap();
        assert_eq!(partial.status, InvoiceStatus::Partial);
        assert_eq!(partial.pending, 5000);

        let paid = service
            .record_payment(id, RecordPaymentRequest { amount: 5000 })
            .await
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        assert_eq!(paid.pending, 0);
        assert_eq!(service.get_invoice(id).await.unwrap().total_paid, 9000);
    }

    #[tokio::test]
    async fn test_invoice_for_unknown_member() {
        let ctx = ServiceContext::in_memory(1);
        let err = InvoiceService::new(&ctx)
            .create_invoice(invoice_request("999", "INV-1"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_MEMBER");
    }

    #[tokio::test]
    async fn test_invoice_rejects_reversed_window() {
        let ctx = ServiceContext::in_memory(1);
        let member_id = enrolled(&ctx).await;
        let request: CreateInvoiceRequest = serde_json::from_value(json!({
            "invoice_number": "INV-2",
            "member_id": member_id,
            "total": 100,
            "items": [{"description": "Day pass", "start_date": "2024-02-01", "expiry_date": "2024-01-01"}]
        }))
        .unwrap();

        let err = InvoiceService::new(&ctx).create_invoice(request).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number() {
        let ctx = ServiceContext::in_memory(1);
        let member_id = enrolled(&ctx).await;
        let service = InvoiceService::new(&ctx);

        service.create_invoice(invoice_request(&member_id, "INV-1")).await.unwrap();
        let err = service
            .create_invoice(invoice_request(&member_id, "INV-1"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVOICE_NUMBER_EXISTS");
    }
}
