//! Ledger service
//!
//! Change-date and freeze-with-extension on invoice items. Both rules live
//! in `gym_core::lifecycle`; this layer resolves the request, hands the
//! atomic part to the [`LedgerRepository`](gym_core::LedgerRepository),
//! publishes the event and guards freezes with the idempotency store.

use chrono::Utc;
use gym_core::events::{ServiceDatesChangedEvent, ServiceFrozenEvent};
use gym_core::{ChangeDates, DomainError, DomainEvent, FreezeCommand, Reservation};
use tracing::{info, instrument, warn};

use crate::dto::{ChangeDateRequest, FreezeRequest, FreezeResponse, InvoiceResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const FREEZE_KEY_SCOPE: &str = "freeze";

/// Ledger service
pub struct LedgerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LedgerService<'a> {
    /// Create a new LedgerService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Rewrite the date window of one invoice item
    ///
    /// The freeze budget is not touched.
    #[instrument(skip(self, request), fields(invoice_id = %request.invoice_id, item_index = request.item_index))]
    pub async fn change_date(
        &self,
        request: ChangeDateRequest,
        actor: Option<String>,
    ) -> ServiceResult<InvoiceResponse> {
        let change = ChangeDates {
            start_date: request.start_date,
            expiry_date: request.expiry_date,
        };
        change.validate()?;

        let invoice = self
            .ctx
            .ledger_repo()
            .change_item_dates(request.invoice_id, request.item_index, &change)
            .await?;

        let item = invoice.item(request.item_index)?;
        info!(
            start_date = ?item.start_date,
            expiry_date = ?item.expiry_date,
            actor = actor.as_deref(),
            "Service dates changed"
        );

        self.publish(DomainEvent::ServiceDatesChanged(ServiceDatesChangedEvent {
            invoice_id: invoice.id,
            member_id: invoice.member_id,
            item_index: request.item_index,
            start_date: item.start_date,
            expiry_date: item.expiry_date,
            actor,
            timestamp: Utc::now(),
        }))
        .await;

        Ok(InvoiceResponse::at(&invoice, Utc::now()))
    }

    /// Freeze an invoice item and extend its expiry by the frozen days
    ///
    /// With an idempotency key the first completed response is replayed for
    /// every later request carrying the same key and body. The same key with
    /// a different body is refused.
    #[instrument(skip(self, request), fields(invoice_id = %request.invoice_id, item_index = request.item_index))]
    pub async fn freeze(
        &self,
        request: FreezeRequest,
        actor: Option<String>,
        idempotency_key: Option<&str>,
    ) -> ServiceResult<FreezeResponse> {
        let Some(key) = idempotency_key else {
            return self.apply_freeze(request, actor).await;
        };

        let key = format!("{FREEZE_KEY_SCOPE}:{key}");
        let fingerprint = request.fingerprint();
        let store = self.ctx.idempotency();

        match store
            .reserve(&key, &fingerprint, self.ctx.idempotency_pending_ttl_seconds())
            .await?
        {
            Reservation::Acquired => {}
            Reservation::InFlight => return Err(DomainError::IdempotencyKeyInFlight.into()),
            Reservation::Mismatch => {
                warn!(key = %key, "Idempotency key reused for a different freeze");
                return Err(DomainError::IdempotencyKeyReused.into());
            }
            Reservation::Completed(body) => {
                info!(key = %key, "Replaying completed freeze");
                let stored: FreezeResponse = serde_json::from_value(body).map_err(|e| {
                    ServiceError::internal(format!("stored freeze response unreadable: {e}"))
                })?;
                return Ok(stored.refreshed(Utc::now()));
            }
        }

        match self.apply_freeze(request, actor).await {
            Ok(response) => {
                let stored = match serde_json::to_value(&response) {
                    Ok(body) => {
                        store
                            .complete(&key, &fingerprint, &body, self.ctx.idempotency_ttl_seconds())
                            .await
                    }
                    Err(e) => Err(DomainError::InternalError(e.to_string())),
                };
                if let Err(e) = stored {
                    warn!(key = %key, error = %e, "Failed to store idempotent freeze response");
                }
                Ok(response)
            }
            Err(err) => {
                if let Err(e) = store.release(&key).await {
                    warn!(key = %key, error = %e, "Failed to release idempotency key");
                }
                Err(err)
            }
        }
    }

    async fn apply_freeze(
        &self,
        request: FreezeRequest,
        actor: Option<String>,
    ) -> ServiceResult<FreezeResponse> {
        let command = FreezeCommand {
            freeze_id: self.ctx.generate_id(),
            invoice_id: request.invoice_id,
            item_index: request.item_index,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            actor,
        };
        let days = command.validate()?;

        let outcome = match self.ctx.ledger_repo().apply_freeze(&command).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if err.is_budget_exceeded() {
                    warn!(days, error = %err, "Freeze refused");
                }
                return Err(err.into());
            }
        };

        let record = &outcome.record;
        info!(
            member_id = %record.member_id,
            freeze_id = %record.id,
            days = record.days,
            total_freeze_days_used = outcome.member.total_freeze_days_used(),
            new_expiry_date = %record.new_expiry_date,
            "Service frozen"
        );

        self.publish(DomainEvent::ServiceFrozen(ServiceFrozenEvent {
            freeze_id: record.id,
            invoice_id: record.invoice_id,
            member_id: record.member_id,
            item_index: record.item_index,
            days: record.days,
            total_freeze_days_used: outcome.member.total_freeze_days_used(),
            new_expiry_date: record.new_expiry_date,
            reason: record.reason.clone(),
            actor: record.actor.clone(),
            timestamp: record.created_at,
        }))
        .await;

        Ok(FreezeResponse::at(&outcome, Utc::now()))
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.ctx.events().publish(&event).await {
            warn!(error = %e, event_type = event.event_type(), "Failed to publish ledger event");
        }
    }
}
