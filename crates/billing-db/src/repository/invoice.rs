//! # Invoice Repository
//!
//! Writes an invoice header and its items as one unit.
//!
//! ## Transaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    InvoiceRepository::create                            │
//! │                                                                         │
//! │  started ──► header-inserted ──► items-inserted ──► committed          │
//! │     │              │                   │                │               │
//! │     │ begin fails  │ header fails      │ item fails     │ commit fails  │
//! │     ▼              ▼                   ▼                ▼               │
//! │  error          rolled-back         rolled-back       error            │
//! │                                                                         │
//! │  Either every row is visible afterwards or none is.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The repository owns the transaction. Header and item storages only
//! receive the connection underneath it.
//!
//! With [`InvoiceRepository::with_timeout`] the caller gets an answer
//! within the limit. Expiry drops the transaction; sqlx rolls it back when
//! the connection is released, which can only happen after any statement
//! still running on the server has finished. Backend locks may therefore
//! outlive the timeout.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Pool, Transaction};
use tracing::{debug, info, warn};

use billing_core::Invoice;

use super::{InvoiceHeaderStorage, InvoiceItemStorage, InvoiceStorage};
use crate::error::{DbError, DbResult};

/// Transactional invoice repository over any header / item storage pair
/// sharing one database type.
pub struct InvoiceRepository<H: InvoiceHeaderStorage, I> {
    pool: Pool<H::Db>,
    headers: H,
    items: I,
    timeout: Option<Duration>,
}

impl<H, I> InvoiceRepository<H, I>
where
    H: InvoiceHeaderStorage,
    I: InvoiceItemStorage<Db = H::Db>,
{
    /// Creates a new InvoiceRepository.
    pub fn new(pool: Pool<H::Db>, headers: H, items: I) -> Self {
        InvoiceRepository {
            pool,
            headers,
            items,
            timeout: None,
        }
    }

    /// Bounds how long each `create` call waits; past it the call returns
    /// `DbError::TransactionFailed` and the abandoned transaction is rolled
    /// back once its connection is released.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn create_in_tx(&self, invoice: &mut Invoice) -> DbResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let inserted = self.headers.create_tx(&mut *tx, &mut invoice.header).await;
        if let Err(err) = inserted {
            rollback(tx, &err).await;
            return Err(err);
        }
        let header_id = invoice.header.id;
        debug!(header_id = header_id, "Invoice header inserted");

        let inserted = self
            .items
            .create_many_tx(&mut *tx, header_id, &mut invoice.items)
            .await;
        if let Err(err) = inserted {
            rollback(tx, &err).await;
            return Err(err);
        }

        tx.commit().await.map_err(DbError::transaction)?;

        info!(
            header_id = header_id,
            items = invoice.items.len(),
            "Invoice created"
        );
        Ok(())
    }
}

#[async_trait]
impl<H, I> InvoiceStorage for InvoiceRepository<H, I>
where
    H: InvoiceHeaderStorage,
    I: InvoiceItemStorage<Db = H::Db>,
{
    async fn create(&self, invoice: &mut Invoice) -> DbResult<()> {
        let Some(limit) = self.timeout else {
            return self.create_in_tx(invoice).await;
        };

        match tokio::time::timeout(limit, self.create_in_tx(invoice)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "Invoice transaction timed out");
                Err(DbError::TransactionFailed(format!(
                    "timed out after {}ms",
                    limit.as_millis()
                )))
            }
        }
    }
}

/// Rolls back after `cause`. A failed rollback is logged; the caller still
/// gets the original error.
async fn rollback<DB: sqlx::Database>(tx: Transaction<'static, DB>, cause: &DbError) {
    warn!(error = %cause, "Rolling back invoice transaction");

    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
}
