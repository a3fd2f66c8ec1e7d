//! Entity to DTO mappers
//!
//! Responses carrying derived status take the evaluation instant explicitly
//! so one request sees one "now".

use chrono::{DateTime, Utc};
use gym_core::entities::{CurrentPlan, FreezeRecord, Invoice, InvoiceItem, Member};
use gym_core::{actual_membership_status, service_status, FreezeBudget, FreezeOutcome};

use super::responses::{
    FreezeBudgetResponse, FreezeRecordResponse, FreezeResponse, InvoiceItemResponse,
    InvoiceResponse, MemberResponse, PlanResponse, ServiceResponse,
};

// ============================================================================
// Member Mappers
// ============================================================================

impl From<&CurrentPlan> for PlanResponse {
    fn from(plan: &CurrentPlan) -> Self {
        Self {
            plan_id: plan.plan_id.clone(),
            plan_name: plan.plan_name.clone(),
            enrolled_at: plan.enrolled_at,
        }
    }
}

impl From<FreezeBudget> for FreezeBudgetResponse {
    fn from(budget: FreezeBudget) -> Self {
        Self {
            used: budget.used(),
            remaining: budget.remaining(),
            budget: budget.limit(),
        }
    }
}

impl MemberResponse {
    /// Member view with the status derived from all of their invoices
    pub fn build(member: &Member, invoices: &[Invoice], now: DateTime<Utc>) -> Self {
        let services = invoices
            .iter()
            .flat_map(|invoice| invoice.items.iter())
            .map(|item| service_status(item.expiry_date, now));

        Self {
            id: member.id.to_string(),
            member_code: member.member_code.clone(),
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
            current_plan: member.current_plan.as_ref().map(PlanResponse::from),
            stored_status: member.status,
            status: actual_membership_status(member.status, services),
            freeze_budget: member.freeze_budget.into(),
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

impl ServiceResponse {
    /// Flatten every item of every invoice into the member's service list
    pub fn list(invoices: &[Invoice], now: DateTime<Utc>) -> Vec<Self> {
        invoices
            .iter()
            .flat_map(|invoice| {
                invoice
                    .items
                    .iter()
                    .enumerate()
                    .map(move |(item_index, item)| {
                        let status = service_status(item.expiry_date, now);
                        Self {
                            invoice_id: invoice.id.to_string(),
                            invoice_number: invoice.invoice_number.clone(),
                            item_index,
                            description: item.description.clone(),
                            duration: item.duration.clone(),
                            start_date: item.start_date,
                            expiry_date: item.expiry_date,
                            is_active: status.is_active,
                            days_remaining: status.days_remaining,
                        }
                    })
            })
            .collect()
    }
}

// ============================================================================
// Invoice Mappers
// ============================================================================

impl InvoiceItemResponse {
    /// Re-derive `is_active` and `days_remaining` from the item's own expiry
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        let status = service_status(self.expiry_date, now);
        self.is_active = status.is_active;
        self.days_remaining = status.days_remaining;
    }

    pub fn at(item_index: usize, item: &InvoiceItem, now: DateTime<Utc>) -> Self {
        let status = service_status(item.expiry_date, now);
        Self {
            item_index,
            description: item.description.clone(),
            duration: item.duration.clone(),
            start_date: item.start_date,
            expiry_date: item.expiry_date,
            is_active: status.is_active,
            days_remaining: status.days_remaining,
        }
    }
}

impl InvoiceResponse {
    pub fn at(invoice: &Invoice, now: DateTime<Utc>) -> Self {
        Self {
            id: invoice.id.to_string(),
            invoice_number: invoice.invoice_number.clone(),
            member_id: invoice.member_id.to_string(),
            status: invoice.status,
            total: invoice.total,
            total_paid: invoice.total_paid,
            pending: invoice.pending(),
            items: invoice
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| InvoiceItemResponse::at(index, item, now))
                .collect(),
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

impl From<&Invoice> for InvoiceResponse {
    fn from(invoice: &Invoice) -> Self {
        Self::at(invoice, Utc::now())
    }
}

// ============================================================================
// Ledger Mappers
// ============================================================================

impl From<&FreezeRecord> for FreezeRecordResponse {
    fn from(record: &FreezeRecord) -> Self {
        Self {
            id: record.id.to_string(),
            member_id: record.member_id.to_string(),
            invoice_id: record.invoice_id.to_string(),
            item_index: record.item_index,
            start_date: record.start_date,
            end_date: record.end_date,
            days: record.days,
            reason: record.reason.clone(),
            actor: record.actor.clone(),
            previous_expiry_date: record.previous_expiry_date,
            new_expiry_date: record.new_expiry_date,
            created_at: record.created_at,
        }
    }
}

impl From<FreezeRecord> for FreezeRecordResponse {
    fn from(record: FreezeRecord) -> Self {
        Self::from(&record)
    }
}

impl FreezeResponse {
    pub fn at(outcome: &FreezeOutcome, now: DateTime<Utc>) -> Self {
        Self {
            invoice: InvoiceResponse::at(&outcome.invoice, now),
            total_freeze_days_used: outcome.member.total_freeze_days_used(),
            remaining_freeze_days: outcome.member.remaining_freeze_days(),
            freeze: FreezeRecordResponse::from(&outcome.record),
        }
    }

    /// A stored response as it reads at `now`; only the derived fields move
    #[must_use]
    pub fn refreshed(mut self, now: DateTime<Utc>) -> Self {
        for item in &mut self.invoice.items {
            item.refresh(now);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use gym_core::{MembershipStatus, Snowflake};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 14, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn invoice_with(items: Vec<InvoiceItem>) -> Invoice {
        Invoice::new(Snowflake::new(10), "INV-10", Snowflake::new(1), 1000, items)
    }

    #[test]
    fn test_invoice_items_carry_derived_status() {
        let live = InvoiceItem::new("Gold").with_window(None, Some(day(2024, 6, 25)));
        let lapsed = InvoiceItem::new("Silver").with_window(None, Some(day(2024, 6, 12)));
        let open = InvoiceItem::new("Locker");

        let response = InvoiceResponse::at(&invoice_with(vec![live, lapsed, open]), now());

        assert_eq!(response.pending, 1000);
        assert!(response.items[0].is_active);
        assert_eq!(response.items[0].days_remaining, 10);
        assert!(!response.items[1].is_active);
        assert_eq!(response.items[1].days_remaining, 0);
        assert!(response.items[2].is_active);
        assert_eq!(response.items[2].item_index, 2);
    }

    #[test]
    fn test_stored_item_refreshed_later() {
        let gold = InvoiceItem::new("Gold").with_window(None, Some(day(2024, 6, 25)));
        let stored = InvoiceResponse::at(&invoice_with(vec![gold]), now());
        assert_eq!(stored.items[0].days_remaining, 10);

        let mut item = stored.items[0].clone();
        item.refresh(day(2024, 6, 20));
        assert!(item.is_active);
        assert_eq!(item.days_remaining, 5);

        item.refresh(day(2024, 7, 1));
        assert!(!item.is_active);
        assert_eq!(item.days_remaining, 0);
        assert_eq!(item.expiry_date, Some(day(2024, 6, 25)));
    }

    #[test]
    fn test_member_status_derived_from_services() {
        let member = Member::new(Snowflake::new(1), "GYM-1", "Ana", "Silva")
            .with_status(MembershipStatus::Expired);

        let live = invoice_with(vec![
            InvoiceItem::new("Gold").with_window(None, Some(now() + Duration::days(1)))
        ]);
        let lapsed = invoice_with(vec![
            InvoiceItem::new("Gold").with_window(None, Some(now() - Duration::days(40)))
        ]);

        let active = MemberResponse::build(&member, &[lapsed.clone(), live], now());
        assert_eq!(active.status, MembershipStatus::Active);
        assert_eq!(active.stored_status, Some(MembershipStatus::Expired));

        let expired = MemberResponse::build(&member, &[lapsed], now());
        assert_eq!(expired.status, MembershipStatus::Expired);
        assert_eq!(expired.freeze_budget.remaining, 30);
    }

    #[test]
    fn test_service_list_flattens_invoices() {
        let first = invoice_with(vec![InvoiceItem::new("A"), InvoiceItem::new("B")]);
        let second = invoice_with(vec![InvoiceItem::new("C")]);

        let services = ServiceResponse::list(&[first, second], now());
        assert_eq!(services.len(), 3);
        assert_eq!(services[1].item_index, 1);
        assert_eq!(services[2].description, "C");
        assert_eq!(services[2].item_index, 0);
    }
}
