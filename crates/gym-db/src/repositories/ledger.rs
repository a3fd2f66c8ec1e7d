//! PostgreSQL implementation of LedgerRepository
//!
//! Each write is one transaction. Rows are locked invoice first, then member,
//! so concurrent ledger writes queue instead of deadlocking.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tracing::{instrument, warn};

use gym_core::entities::{FreezeRecord, Invoice, Member};
use gym_core::error::DomainError;
use gym_core::lifecycle::{apply_change_dates, apply_freeze, ChangeDates, FreezeCommand};
use gym_core::traits::{FreezeOutcome, LedgerRepository, RepoResult};
use gym_core::value_objects::{FreezeBudget, Snowflake, FREEZE_DAY_BUDGET};

use crate::mappers::FreezeInsert;
use crate::models::{FreezeModel, MemberModel};

use super::error::map_db_error;
use super::invoice::lock_invoice;

/// PostgreSQL implementation of LedgerRepository
#[derive(Clone)]
pub struct PgLedgerRepository {
    pool: PgPool,
}

impl PgLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_member(conn: &mut PgConnection, id: Snowflake) -> RepoResult<Member> {
    sqlx::query_as::<_, MemberModel>(
        r#"
        SELECT id, member_code, first_name, last_name, email, phone,
               plan_id, plan_name, plan_enrolled_at, status,
               total_freeze_days_used, created_at, updated_at
        FROM members
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id.into_inner())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?
    .ok_or(DomainError::MemberNotFound(id))
    .and_then(Member::try_from)
}

async fn write_items(conn: &mut PgConnection, invoice: &Invoice) -> RepoResult<()> {
    sqlx::query(
        r#"
        UPDATE invoices SET items = $2, updated_at = $3 WHERE id = $1
        "#,
    )
    .bind(invoice.id.into_inner())
    .bind(Json(invoice.items.as_slice()))
    .bind(invoice.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

/// Debit the counter only if it still fits the budget
///
/// Returns the stored total, or `None` when the guard refused the debit.
async fn debit_freeze_days(
    conn: &mut PgConnection,
    record: &FreezeRecord,
) -> RepoResult<Option<u32>> {
    let used = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE members
        SET total_freeze_days_used = total_freeze_days_used + $2, updated_at = $3
        WHERE id = $1 AND total_freeze_days_used + $2 <= $4
        RETURNING total_freeze_days_used
        "#,
    )
    .bind(record.member_id.into_inner())
    .bind(record.days as i32)
    .bind(record.created_at)
    .bind(FREEZE_DAY_BUDGET as i32)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;

    Ok(used.map(|u| u as u32))
}

async fn insert_freeze(conn: &mut PgConnection, insert: FreezeInsert<'_>) -> RepoResult<()> {
    let record = insert.record;

    sqlx::query(
        r#"
        INSERT INTO service_freezes (
            id, member_id, invoice_id, item_index, start_date, end_date, days,
            reason, actor, previous_expiry_date, new_expiry_date, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(insert.id)
    .bind(insert.member_id)
    .bind(insert.invoice_id)
    .bind(insert.item_index)
    .bind(record.start_date)
    .bind(record.end_date)
    .bind(insert.days)
    .bind(record.reason.as_deref())
    .bind(record.actor.as_deref())
    .bind(record.previous_expiry_date)
    .bind(record.new_expiry_date)
    .bind(record.created_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

#[async_trait]
impl LedgerRepository for PgLedgerRepository {
    #[instrument(skip(self, change))]
    async fn change_item_dates(
        &self,
        invoice_id: Snowflake,
        item_index: usize,
        change: &ChangeDates,
    ) -> RepoResult<Invoice> {
        change.validate()?;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut invoice = lock_invoice(&mut *tx, invoice_id).await?;
        apply_change_dates(&mut invoice, item_index, change)?;
        write_items(&mut *tx, &invoice).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(invoice)
    }

    #[instrument(skip(self, command), fields(invoice_id = %command.invoice_id, item_index = command.item_index))]
    async fn apply_freeze(&self, command: &FreezeCommand) -> RepoResult<FreezeOutcome> {
        command.validate()?;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut invoice = lock_invoice(&mut *tx, command.invoice_id).await?;
        let mut member = lock_member(&mut *tx, invoice.member_id).await?;

        let before = member.freeze_budget;
        let record = apply_freeze(&mut member, &mut invoice, command, Utc::now())?;

        // The row lock makes this unreachable unless something wrote the
        // counter outside a transaction
        let Some(used) = debit_freeze_days(&mut *tx, &record).await? else {
            warn!(member_id = %member.id, days = record.days, "Storage guard refused freeze debit");
            return Err(DomainError::FreezeBudgetExceeded {
                requested: record.days,
                remaining: before.remaining(),
            });
        };
        member.freeze_budget = FreezeBudget::with_used(used);
        write_items(&mut *tx, &invoice).await?;
        insert_freeze(&mut *tx, FreezeInsert::new(&record)).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(FreezeOutcome {
            invoice,
            member,
            record,
        })
    }

    #[instrument(skip(self))]
    async fn find_freezes_by_member(&self, member_id: Snowflake) -> RepoResult<Vec<FreezeRecord>> {
        let models = sqlx::query_as::<_, FreezeModel>(
            r#"
            SELECT id, member_id, invoice_id, item_index, start_date, end_date, days,
                   reason, actor, previous_expiry_date, new_expiry_date, created_at
            FROM service_freezes
            WHERE member_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(member_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(FreezeRecord::try_from).collect()
    }
}
