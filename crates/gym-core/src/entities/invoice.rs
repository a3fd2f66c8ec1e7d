//! Invoice entity - a bill for one member, with one line item per purchased service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::lifecycle::DateWindow;
use crate::value_objects::Snowflake;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Partial,
    Overdue,
    Cancelled,
    Refunded,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Partial => "partial",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "partial" => Ok(Self::Partial),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(DomainError::ValidationError(format!(
                "Unknown invoice status: {other}"
            ))),
        }
    }

    /// Cancelled and refunded invoices are closed to new payments
    #[inline]
    pub fn accepts_payments(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::Refunded)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchased service on an invoice
///
/// Stored inline with the invoice; addressed by its position in `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl InvoiceItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            duration: None,
            start_date: None,
            expiry_date: None,
        }
    }

    pub fn with_window(
        mut self,
        start_date: Option<DateTime<Utc>>,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start_date;
        self.expiry_date = expiry_date;
        self
    }

    #[inline]
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.expiry_date)
    }
}

/// Invoice entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: Snowflake,
    pub invoice_number: String,
    pub member_id: Snowflake,
    pub status: InvoiceStatus,
    /// Amounts are in minor currency units
    pub total: i64,
    pub total_paid: i64,
    pub items: Vec<InvoiceItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        id: Snowflake,
        invoice_number: impl Into<String>,
        member_id: Snowflake,
        total: i64,
        items: Vec<InvoiceItem>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            invoice_number: invoice_number.into(),
            member_id,
            status: InvoiceStatus::default(),
            total,
            total_paid: 0,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    /// Outstanding balance, never negative
    #[inline]
    pub fn pending(&self) -> i64 {
        (self.total - self.total_paid).max(0)
    }

    /// Look up an item by position
    pub fn item(&self, index: usize) -> Result<&InvoiceItem, DomainError> {
        self.items.get(index).ok_or(DomainError::InvoiceItemNotFound {
            invoice_id: self.id,
            index,
        })
    }

    pub fn item_mut(&mut self, index: usize) -> Result<&mut InvoiceItem, DomainError> {
        let invoice_id = self.id;
        self.items
            .get_mut(index)
            .ok_or(DomainError::InvoiceItemNotFound { invoice_id, index })
    }

    /// Check invariants that must hold for a newly issued invoice
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::ValidationError(
                "Invoice must have at least one item".to_string(),
            ));
        }
        if self.total < 0 {
            return Err(DomainError::ValidationError(
                "Invoice total cannot be negative".to_string(),
            ));
        }
        for (index, item) in self.items.iter().enumerate() {
            if !item.window().is_ordered() {
                return Err(DomainError::ValidationError(format!(
                    "Item {index}: expiry date is before start date"
                )));
            }
        }
        Ok(())
    }

    /// Record a payment and move the status along
    pub fn apply_payment(&mut self, amount: i64) -> Result<(), DomainError> {
        if amount <= 0 {
            return Err(DomainError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }
        if !self.status.accepts_payments() {
            return Err(DomainError::InvoiceClosed(self.status.to_string()));
        }

        self.total_paid = self.total_paid.saturating_add(amount);
        self.status = if self.pending() == 0 {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Partial
        };
        self.updated_at = Utc::now();
        Ok(())
    }
}
