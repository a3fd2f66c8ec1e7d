//! Domain events - events emitted when ledger state changes
//!
//! These events are used for:
//! - Notifying front-desk screens that a member's services changed
//! - Audit logging of freezes and date corrections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    MemberEnrolled(MemberEnrolledEvent),
    InvoiceCreated(InvoiceCreatedEvent),
    PaymentRecorded(PaymentRecordedEvent),
    ServiceDatesChanged(ServiceDatesChangedEvent),
    ServiceFrozen(ServiceFrozenEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MemberEnrolled(_) => "MEMBER_ENROLLED",
            Self::InvoiceCreated(_) => "INVOICE_CREATED",
            Self::PaymentRecorded(_) => "PAYMENT_RECORDED",
            Self::ServiceDatesChanged(_) => "SERVICE_DATES_CHANGED",
            Self::ServiceFrozen(_) => "SERVICE_FROZEN",
        }
    }

    /// The member whose ledger the event touches
    pub fn member_id(&self) -> Snowflake {
        match self {
            Self::MemberEnrolled(e) => e.member_id,
            Self::InvoiceCreated(e) => e.member_id,
            Self::PaymentRecorded(e) => e.member_id,
            Self::ServiceDatesChanged(e) => e.member_id,
            Self::ServiceFrozen(e) => e.member_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MemberEnrolled(e) => e.timestamp,
            Self::InvoiceCreated(e) => e.timestamp,
            Self::PaymentRecorded(e) => e.timestamp,
            Self::ServiceDatesChanged(e) => e.timestamp,
            Self::ServiceFrozen(e) => e.timestamp,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberEnrolledEvent {
    pub member_id: Snowflake,
    pub member_code: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreatedEvent {
    pub invoice_id: Snowflake,
    pub member_id: Snowflake,
    pub total: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecordedEvent {
    pub invoice_id: Snowflake,
    pub member_id: Snowflake,
    pub amount: i64,
    pub pending: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDatesChangedEvent {
    pub invoice_id: Snowflake,
    pub member_id: Snowflake,
    pub item_index: usize,
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub actor: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceFrozenEvent {
    pub freeze_id: Snowflake,
    pub invoice_id: Snowflake,
    pub member_id: Snowflake,
    pub item_index: usize,
    pub days: u32,
    pub total_freeze_days_used: u32,
    pub new_expiry_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub actor: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Constructors
// ============================================================================

impl MemberEnrolledEvent {
    pub fn new(member_id: Snowflake, member_code: impl Into<String>) -> Self {
        Self {
            member_id,
            member_code: member_code.into(),
            timestamp: Utc::now(),
        }
    }
}

impl InvoiceCreatedEvent {
    pub fn new(invoice_id: Snowflake, member_id: Snowflake, total: i64) -> Self {
        Self {
            invoice_id,
            member_id,
            total,
            timestamp: Utc::now(),
        }
    }
}

impl PaymentRecordedEvent {
    pub fn new(invoice_id: Snowflake, member_id: Snowflake, amount: i64, pending: i64) -> Self {
        Self {
            invoice_id,
            member_id,
            amount,
            pending,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = DomainEvent::ServiceFrozen(ServiceFrozenEvent {
            freeze_id: Snowflake::new(9),
            invoice_id: Snowflake::new(2),
            member_id: Snowflake::new(1),
            item_index: 0,
            days: 5,
            total_freeze_days_used: 30,
            new_expiry_date: Utc::now(),
            reason: Some("Injury".to_string()),
            actor: None,
            timestamp: Utc::now(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SERVICE_FROZEN"));

        let parsed: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type(), "SERVICE_FROZEN");
        assert_eq!(parsed.member_id(), Snowflake::new(1));
    }

    #[test]
    fn test_event_type() {
        let event = DomainEvent::MemberEnrolled(MemberEnrolledEvent::new(Snowflake::new(1), "GYM-1"));
        assert_eq!(event.event_type(), "MEMBER_ENROLLED");
    }
}
