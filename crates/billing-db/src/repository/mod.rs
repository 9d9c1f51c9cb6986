//! # Repository Module
//!
//! Storage contracts and their PostgreSQL / MySQL implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storage Contracts                                    │
//! │                                                                         │
//! │  ProductStorage            (dyn-safe, one per dialect)                  │
//! │  ├── migrate / create / get_all / get_by_id / update / delete          │
//! │                                                                         │
//! │  InvoiceHeaderStorage      (bound to one sqlx::Database)               │
//! │  └── create_tx(conn, header)          ◄─┐                              │
//! │                                          │  same transaction            │
//! │  InvoiceItemStorage                      │                              │
//! │  └── create_many_tx(conn, id, items)  ◄─┤                              │
//! │                                          │                              │
//! │  InvoiceStorage                          │                              │
//! │  └── create(invoice) ── InvoiceRepository<H, I> begins / commits ─┘    │
//! │                                                                         │
//! │  Migrate                   (create-table-if-not-exists, every repo)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `*_tx` methods run on the connection they are handed and never
//! begin, commit or roll back on their own.
//!
//! ## Available Repositories
//!
//! - [`postgres`] - PostgreSQL implementations
//! - [`mysql`] - MySQL implementations
//! - [`invoice`] - Transactional invoice composite (any dialect)
//! - [`queries`] - SQL text per dialect

use async_trait::async_trait;
use billing_core::{Invoice, InvoiceHeader, InvoiceItem, Product, Products};

use crate::error::DbResult;

pub mod invoice;
pub mod mysql;
pub mod postgres;
pub mod queries;

/// Schema creation for one table.
#[async_trait]
pub trait Migrate: Send + Sync {
    /// Name of the table this repository owns.
    fn table(&self) -> &'static str;

    /// Creates the table if it does not exist.
    ///
    /// A failing statement is returned as `DbError::MigrationFailed`.
    async fn migrate(&self) -> DbResult<()>;
}

/// Product persistence.
#[async_trait]
pub trait ProductStorage: Migrate {
    /// Inserts `product` and writes the generated id back into it.
    async fn create(&self, product: &mut Product) -> DbResult<()>;

    /// Returns every product, in storage order.
    async fn get_all(&self) -> DbResult<Products>;

    /// Returns the product with `id`, or `DbError::NotFound`.
    async fn get_by_id(&self, id: i64) -> DbResult<Product>;

    /// Overwrites name, observations, price and updated_at of the row
    /// matching `product.id`. Zero affected rows is `DbError::NotFound`.
    async fn update(&self, product: &Product) -> DbResult<()>;

    /// Deletes the row with `id`. Zero affected rows is `DbError::NotFound`.
    async fn delete(&self, id: i64) -> DbResult<()>;
}

/// Invoice header persistence inside a caller-owned transaction.
#[async_trait]
pub trait InvoiceHeaderStorage: Migrate {
    type Db: sqlx::Database;

    /// Inserts `header` on `conn`, assigning its id (and `created_at` when
    /// the backend returns it).
    async fn create_tx(
        &self,
        conn: &mut <Self::Db as sqlx::Database>::Connection,
        header: &mut InvoiceHeader,
    ) -> DbResult<()>;
}

/// Invoice item persistence inside a caller-owned transaction.
#[async_trait]
pub trait InvoiceItemStorage: Migrate {
    type Db: sqlx::Database;

    /// Inserts one row per item, in order, all referencing `header_id`.
    ///
    /// Stops at the first failure and returns it; rows already written
    /// are left to the caller's rollback.
    async fn create_many_tx(
        &self,
        conn: &mut <Self::Db as sqlx::Database>::Connection,
        header_id: i64,
        items: &mut [InvoiceItem],
    ) -> DbResult<()>;
}

/// Atomic invoice persistence.
#[async_trait]
pub trait InvoiceStorage: Send + Sync {
    /// Persists the header and all items in one transaction.
    async fn create(&self, invoice: &mut Invoice) -> DbResult<()>;
}
