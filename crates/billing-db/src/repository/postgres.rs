//! # PostgreSQL Repositories
//!
//! Products, invoice headers and invoice items on PostgreSQL.
//!
//! Generated columns come back through `RETURNING`, so headers and items
//! get both their id and `created_at` filled in on insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use billing_core::{InvoiceHeader, InvoiceItem, Product, Products};

use super::queries::POSTGRES;
use super::{InvoiceHeaderStorage, InvoiceItemStorage, Migrate, ProductStorage};
use crate::error::{DbError, DbResult};
use crate::mapping::{string_to_null, time_to_null, ProductRow};

/// Runs one create-table statement.
async fn run_migration(pool: &PgPool, table: &str, sql: &str) -> DbResult<()> {
    sqlx::query(sql)
        .execute(pool)
        .await
        .map_err(|e| DbError::migration(table, e))?;

    info!(table = %table, driver = "POSTGRES", "Migration applied");
    Ok(())
}

// =============================================================================
// Products
// =============================================================================

/// Product repository for PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Creates a new PgProductRepository.
    pub fn new(pool: PgPool) -> Self {
        PgProductRepository { pool }
    }
}

#[async_trait]
impl Migrate for PgProductRepository {
    fn table(&self) -> &'static str {
        "products"
    }

    async fn migrate(&self) -> DbResult<()> {
        run_migration(&self.pool, self.table(), POSTGRES.migrate_product).await
    }
}

#[async_trait]
impl ProductStorage for PgProductRepository {
    async fn create(&self, product: &mut Product) -> DbResult<()> {
        debug!(name = %product.name, "Inserting product");

        let id: i64 = sqlx::query_scalar(POSTGRES.create_product)
            .bind(&product.name)
            .bind(string_to_null(&product.observations))
            .bind(product.price)
            .bind(product.created_at)
            .fetch_one(&self.pool)
            .await?;

        product.id = id;
        debug!(id = product.id, "Product created");
        Ok(())
    }

    async fn get_all(&self) -> DbResult<Products> {
        let rows: Vec<ProductRow> = sqlx::query_as(POSTGRES.get_all_products)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Loaded products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        let row: Option<ProductRow> = sqlx::query_as(POSTGRES.get_product_by_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::from)
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let result = sqlx::query(POSTGRES.update_product)
            .bind(&product.name)
            .bind(string_to_null(&product.observations))
            .bind(product.price)
            .bind(time_to_null(product.updated_at))
            .bind(product.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deleting product");

        let result = sqlx::query(POSTGRES.delete_product)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Invoice Headers
// =============================================================================

/// Invoice header repository for PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgInvoiceHeaderRepository {
    pool: PgPool,
}

impl PgInvoiceHeaderRepository {
    /// Creates a new PgInvoiceHeaderRepository.
    pub fn new(pool: PgPool) -> Self {
        PgInvoiceHeaderRepository { pool }
    }
}

#[async_trait]
impl Migrate for PgInvoiceHeaderRepository {
    fn table(&self) -> &'static str {
        "invoice_headers"
    }

    async fn migrate(&self) -> DbResult<()> {
        run_migration(&self.pool, self.table(), POSTGRES.migrate_invoice_header).await
    }
}

#[async_trait]
impl InvoiceHeaderStorage for PgInvoiceHeaderRepository {
    type Db = sqlx::Postgres;

    async fn create_tx(&self, conn: &mut PgConnection, header: &mut InvoiceHeader) -> DbResult<()> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(POSTGRES.create_invoice_header)
            .bind(&header.client)
            .fetch_one(&mut *conn)
            .await?;

        header.id = id;
        header.created_at = Some(created_at);
        Ok(())
    }
}

// =============================================================================
// Invoice Items
// =============================================================================

/// Invoice item repository for PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgInvoiceItemRepository {
    pool: PgPool,
}

impl PgInvoiceItemRepository {
    /// Creates a new PgInvoiceItemRepository.
    pub fn new(pool: PgPool) -> Self {
        PgInvoiceItemRepository { pool }
    }
}

#[async_trait]
impl Migrate for PgInvoiceItemRepository {
    fn table(&self) -> &'static str {
        "invoice_items"
    }

    async fn migrate(&self) -> DbResult<()> {
        run_migration(&self.pool, self.table(), POSTGRES.migrate_invoice_item).await
    }
}

#[async_trait]
impl InvoiceItemStorage for PgInvoiceItemRepository {
    type Db = sqlx::Postgres;

    async fn create_many_tx(
        &self,
        conn: &mut PgConnection,
        header_id: i64,
        items: &mut [InvoiceItem],
    ) -> DbResult<()> {
        for item in items.iter_mut() {
            let (id, created_at): (i64, DateTime<Utc>) =
                sqlx::query_as(POSTGRES.create_invoice_item)
                    .bind(header_id)
                    .bind(item.product_id)
                    .fetch_one(&mut *conn)
                    .await?;

            item.id = id;
            item.invoice_header_id = header_id;
            item.created_at = Some(created_at);
        }

        debug!(header_id = header_id, count = items.len(), "Invoice items inserted");
        Ok(())
    }
}
