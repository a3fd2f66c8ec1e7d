//! In-memory implementation of the member, invoice and ledger repositories
//!
//! All state sits behind one `RwLock`. Reads share it; every write takes it
//! exclusively for its whole check-then-mutate sequence, so a freeze's budget
//! check and debit cannot interleave with another freeze.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;

use gym_core::entities::{FreezeRecord, Invoice, Member};
use gym_core::error::DomainError;
use gym_core::lifecycle::{apply_change_dates, apply_freeze, ChangeDates, FreezeCommand};
use gym_core::traits::{
    FreezeOutcome, InvoiceRepository, LedgerRepository, MemberRepository, RepoResult,
};
use gym_core::value_objects::Snowflake;

#[derive(Debug, Default)]
struct State {
    members: HashMap<Snowflake, Member>,
    member_codes: HashMap<String, Snowflake>,
    invoices: HashMap<Snowflake, Invoice>,
    invoice_numbers: HashSet<String>,
    freezes: Vec<FreezeRecord>,
}

/// Process-local store implementing every repository trait
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored members
    pub fn member_count(&self) -> usize {
        self.state.read().members.len()
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Member>> {
        Ok(self.state.read().members.get(&id).cloned())
    }

    async fn find_by_code(&self, member_code: &str) -> RepoResult<Option<Member>> {
        let state = self.state.read();
        Ok(state
            .member_codes
            .get(member_code)
            .and_then(|id| state.members.get(id))
            .cloned())
    }

    #[instrument(skip(self, member), fields(member_id = %member.id))]
    async fn create(&self, member: &Member) -> RepoResult<()> {
        let mut state = self.state.write();
        if state.member_codes.contains_key(&member.member_code) {
            return Err(DomainError::MemberCodeExists(member.member_code.clone()));
        }
        state
            .member_codes
            .insert(member.member_code.clone(), member.id);
        state.members.insert(member.id, member.clone());
        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Invoice>> {
        Ok(self.state.read().invoices.get(&id).cloned())
    }

    async fn find_by_member(&self, member_id: Snowflake) -> RepoResult<Vec<Invoice>> {
        let mut invoices: Vec<Invoice> = self
            .state
            .read()
            .invoices
            .values()
            .filter(|inv| inv.member_id == member_id)
            .cloned()
            .collect();
        invoices.sort_by_key(|inv| (inv.created_at, inv.id));
        Ok(invoices)
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    async fn create(&self, invoice: &Invoice) -> RepoResult<()> {
        let mut state = self.state.write();
        if !state.members.contains_key(&invoice.member_id) {
            return Err(DomainError::MemberNotFound(invoice.member_id));
        }
        if !state.invoice_numbers.insert(invoice.invoice_number.clone()) {
            return Err(DomainError::InvoiceNumberExists(
                invoice.invoice_number.clone(),
            ));
        }
        state.invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_payment(&self, invoice_id: Snowflake, amount: i64) -> RepoResult<Invoice> {
        let mut state = self.state.write();
        let invoice = state
            .invoices
            .get_mut(&invoice_id)
            .ok_or(DomainError::InvoiceNotFound(invoice_id))?;
        invoice.apply_payment(amount)?;
        Ok(invoice.clone())
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    #[instrument(skip(self, change))]
    async fn change_item_dates(
        &self,
        invoice_id: Snowflake,
        item_index: usize,
        change: &ChangeDates,
    ) -> RepoResult<Invoice> {
        change.validate()?;
        let mut state = self.state.write();
        let invoice = state
            .invoices
            .get_mut(&invoice_id)
            .ok_or(DomainError::InvoiceNotFound(invoice_id))?;
        apply_change_dates(invoice, item_index, change)?;
        Ok(invoice.clone())
    }

    #[instrument(skip(self, command), fields(invoice_id = %command.invoice_id))]
    async fn apply_freeze(&self, command: &FreezeCommand) -> RepoResult<FreezeOutcome> {
        command.validate()?;
        let mut guard = self.state.write();
        let state = &mut *guard;

        let invoice = state
            .invoices
            .get_mut(&command.invoice_id)
            .ok_or(DomainError::InvoiceNotFound(command.invoice_id))?;
        let member = state
            .members
            .get_mut(&invoice.member_id)
            .ok_or(DomainError::MemberNotFound(invoice.member_id))?;

        let record = apply_freeze(member, invoice, command, Utc::now())?;
        state.freezes.push(record.clone());

        Ok(FreezeOutcome {
            invoice: invoice.clone(),
            member: member.clone(),
            record,
        })
    }

    async fn find_freezes_by_member(&self, member_id: Snowflake) -> RepoResult<Vec<FreezeRecord>> {
        let state = self.state.read();
        // appended in commit order
        Ok(state
            .freezes
            .iter()
            .rev()
            .filter(|f| f.member_id == member_id)
            .cloned()
            .collect())
    }
}
