//! PostgreSQL implementation of InvoiceRepository

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use gym_core::entities::Invoice;
use gym_core::error::DomainError;
use gym_core::traits::{InvoiceRepository, RepoResult};
use gym_core::value_objects::Snowflake;

use crate::mappers::InvoiceInsert;
use crate::models::InvoiceModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of InvoiceRepository
#[derive(Clone)]
pub struct PgInvoiceRepository {
    pool: PgPool,
}

impl PgInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Load an invoice and hold its row lock until the transaction ends
pub(super) async fn lock_invoice(conn: &mut PgConnection, id: Snowflake) -> RepoResult<Invoice> {
    sqlx::query_as::<_, InvoiceModel>(
        r#"
        SELECT id, invoice_number, member_id, status, total, total_paid,
               items, created_at, updated_at
        FROM invoices
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id.into_inner())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?
    .ok_or(DomainError::InvoiceNotFound(id))
    .and_then(Invoice::try_from)
}

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Invoice>> {
        sqlx::query_as::<_, InvoiceModel>(
            r#"
            SELECT id, invoice_number, member_id, status, total, total_paid,
                   items, created_at, updated_at
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .map(Invoice::try_from)
        .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, member_id: Snowflake) -> RepoResult<Vec<Invoice>> {
        let models = sqlx::query_as::<_, InvoiceModel>(
            r#"
            SELECT id, invoice_number, member_id, status, total, total_paid,
                   items, created_at, updated_at
            FROM invoices
            WHERE member_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(member_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(Invoice::try_from).collect()
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    async fn create(&self, invoice: &Invoice) -> RepoResult<()> {
        let insert = InvoiceInsert::new(invoice);

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, member_id, status, total, total_paid,
                items, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(insert.id)
        .bind(insert.invoice_number)
        .bind(insert.member_id)
        .bind(insert.status)
        .bind(insert.total)
        .bind(insert.total_paid)
        .bind(insert.items)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::InvoiceNumberExists(invoice.invoice_number.clone())
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_payment(&self, invoice_id: Snowflake, amount: i64) -> RepoResult<Invoice> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut invoice = lock_invoice(&mut *tx, invoice_id).await?;
        invoice.apply_payment(amount)?;

        sqlx::query(
            r#"
            UPDATE invoices
            SET total_paid = $2, status = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(invoice.id.into_inner())
        .bind(invoice.total_paid)
        .bind(invoice.status.as_str())
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(invoice)
    }
}
